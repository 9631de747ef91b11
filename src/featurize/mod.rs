//! Molecule featurization.
//!
//! [`mol_to_graph`] encodes every atom as a fixed-width feature row (see
//! [`AtomRecord`] for the layout) and every bond as one or two directed
//! edges. [`global_features`] summarizes the whole molecule as
//! `[molecular weight, TPSA, logP, H-bond donors]`.
//!
//! Both expect a sanitized molecule, normally with explicit hydrogens added
//! by [`crate::chem::add_hydrogens`].

mod atom;
mod error;
pub mod vocab;

pub use atom::{ATOM_FEATURE_DIM, AtomRecord};
pub use error::Error;

use crate::chem::{self, GasteigerConfig, descriptors};
use crate::graph::{GraphBuilder, MolGraph};
use crate::model::molecule::Molecule;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of entries in the [`global_features`] vector.
pub const GLOBAL_FEATURE_DIM: usize = 4;

/// How bonds become edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// One edge per bond, from its begin atom to its end atom.
    #[default]
    Forward,
    /// Both directions of every bond.
    Symmetric,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturizerConfig {
    pub edge_direction: EdgeDirection,
    /// Adds an edge from every node to itself after the bond edges.
    pub self_loops: bool,
    pub gasteiger: GasteigerConfig,
}

/// Converts a molecule into a graph with one node per atom, in atom order.
///
/// Gasteiger charges are computed first and stored on the molecule; the
/// computation starts from formal charges, so repeated calls give the same
/// result.
///
/// # Errors
///
/// - [`Error::UnknownAtomType`] for an element outside the vocabulary.
/// - [`Error::Chem`] if a custom Gasteiger parameter table fails to parse.
pub fn mol_to_graph(mol: &mut Molecule, config: &FeaturizerConfig) -> Result<MolGraph, Error> {
    chem::assign_gasteiger_charges(mol, &config.gasteiger)?;

    let n = mol.atom_count();
    let per_bond = match config.edge_direction {
        EdgeDirection::Forward => 1,
        EdgeDirection::Symmetric => 2,
    };
    let num_edges = mol.bond_count() * per_bond + if config.self_loops { n } else { 0 };

    let mut builder = GraphBuilder::with_capacity(n, num_edges, ATOM_FEATURE_DIM);
    let mut row = Array1::zeros(ATOM_FEATURE_DIM);
    for idx in 0..n {
        AtomRecord::from_atom(mol, idx).encode_into(row.view_mut())?;
        builder.push_node(row.view())?;
    }

    for bond in &mol.bonds {
        builder.push_edge(bond.begin, bond.end);
        if config.edge_direction == EdgeDirection::Symmetric {
            builder.push_edge(bond.end, bond.begin);
        }
    }
    if config.self_loops {
        for idx in 0..n {
            builder.push_edge(idx, idx);
        }
    }

    let graph = builder.build()?;
    debug!(
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        "featurized molecule"
    );
    Ok(graph)
}

/// `[molecular weight, TPSA, Crippen logP, H-bond donor count]`.
pub fn global_features(mol: &Molecule) -> [f32; GLOBAL_FEATURE_DIM] {
    [
        descriptors::molecular_weight(mol) as f32,
        descriptors::tpsa(mol) as f32,
        descriptors::crippen_logp(mol) as f32,
        descriptors::num_h_donors(mol) as f32,
    ]
}
