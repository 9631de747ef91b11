//! Core data structures representing molecules.
//!
//! - [`types`] – Elements, bond orders, chirality tags and hybridization states.
//! - [`atom`] – An atom with its hydrogen bookkeeping and perceived chemistry.
//! - [`molecule`] – Atoms plus bonds, with valence and neighbor queries.
//!
//! A [`Molecule`](molecule::Molecule) is produced by the readers in
//! [`crate::io`], completed by [`crate::chem`], and consumed read-only by the
//! featurizer (except for the partial charges it assigns).

pub mod atom;
pub mod molecule;
pub mod types;
