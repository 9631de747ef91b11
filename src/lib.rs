//! Molecule featurization and graph attention networks for predicting
//! properties of compounds given as InChI strings.
//!
//! The crate takes an identifier all the way to a prediction: it parses the
//! InChI into a molecule, perceives its chemistry, encodes every atom as a
//! fixed-width feature row and runs a multi-head graph attention network over
//! batches of the resulting graphs.
//!
//! # Features
//!
//! - **InChI and SDF reading**: connectivity, charges, protons, isotopes,
//!   stereo parities and bond-order reconstruction.
//! - **Chemistry perception**: valence and implicit hydrogens, rings,
//!   aromaticity, hybridization, Gasteiger–Marsili partial charges and
//!   whole-molecule descriptors.
//! - **Featurization**: a 46-wide atom encoding and a four-value global
//!   descriptor vector.
//! - **Datasets**: labeled, masked InChI collections yielding collated
//!   mini-batches.
//! - **Model**: GAT inference with serde-serializable parameters and masked
//!   losses.
//!
//! # Quick Start
//!
//! ```
//! use chem_gat::{BatchedGraph, FeaturizerConfig, Gat, GatConfig};
//! use chem_gat::{add_hydrogens, global_features, mol_to_graph, parse_inchi};
//!
//! let ethanol = parse_inchi("InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3")?;
//! let mut mol = add_hydrogens(&ethanol);
//!
//! let graph = mol_to_graph(&mut mol, &FeaturizerConfig::default())?;
//! assert_eq!(graph.num_nodes(), 9);
//! assert_eq!(graph.num_edges(), 8);
//!
//! let [weight, ..] = global_features(&mol);
//! assert!((weight - 46.07).abs() < 0.01);
//!
//! let model = Gat::new(&GatConfig { seed: Some(7), ..Default::default() })?;
//! let prediction = model.forward(&BatchedGraph::from(graph))?;
//! assert_eq!(prediction.dim(), (1, 1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`]: InChI and SDF readers
//! - [`chem`]: sanitization, hydrogens, charges and descriptors
//! - [`featurize`]: [`mol_to_graph`] and [`global_features`]
//! - [`graph`]: [`MolGraph`], [`GraphBuilder`] and [`BatchedGraph`]
//! - [`data`]: [`GraphData`] and [`collate_pair`]
//! - [`gat`]: [`Gat`], [`GatConv`] and the masked losses
//! - [`model`]: [`Molecule`], [`Atom`] and the chemical enums

pub mod chem;
pub mod data;
pub mod featurize;
pub mod gat;
pub mod graph;
pub mod io;
pub mod model;

pub use model::atom::Atom;
pub use model::molecule::{Bond, Molecule};
pub use model::types::{
    BondOrder, Chirality, Element, Hybridization, ParseBondOrderError, ParseElementError,
};

pub use chem::{GasteigerConfig, add_hydrogens, assign_gasteiger_charges, sanitize};
pub use data::{Batch, GraphData, Sample, collate_pair};
pub use featurize::{
    ATOM_FEATURE_DIM, AtomRecord, EdgeDirection, FeaturizerConfig, GLOBAL_FEATURE_DIM,
    global_features, mol_to_graph,
};
pub use gat::{Activation, Gat, GatConfig, GatConv, Pooling};
pub use graph::{BatchedGraph, GraphBuilder, MolGraph};
pub use io::{Format, parse_inchi, read_molecule};
