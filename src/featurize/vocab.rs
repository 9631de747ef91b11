//! Categorical vocabularies of the atom feature vector.
//!
//! The position of every entry is part of the encoding: trained models
//! depend on it, so entries are never reordered or inserted.

use crate::model::types::{Chirality, Hybridization};

/// Atom types, sorted by symbol. There is no bucket for other elements.
pub const ATOM_TYPES: [&str; 22] = [
    "Ag", "As", "B", "Br", "C", "Ca", "Cl", "F", "H", "I", "K", "Li", "Mg", "N", "Na", "O", "P",
    "S", "Se", "Si", "Te", "Zn",
];

pub const CHIRALITIES: [Chirality; 4] = [
    Chirality::Other,
    Chirality::TetrahedralCcw,
    Chirality::TetrahedralCw,
    Chirality::Unspecified,
];

pub const HYBRIDIZATIONS: [Hybridization; 8] = [
    Hybridization::Other,
    Hybridization::S,
    Hybridization::Sp,
    Hybridization::Sp2,
    Hybridization::Sp3,
    Hybridization::Sp3d,
    Hybridization::Sp3d2,
    Hybridization::Unspecified,
];

pub fn atom_type_index(symbol: &str) -> Option<usize> {
    ATOM_TYPES.binary_search(&symbol).ok()
}

pub fn chirality_index(tag: Chirality) -> usize {
    CHIRALITIES
        .iter()
        .position(|&c| c == tag)
        .unwrap_or(0)
}

pub fn hybridization_index(hyb: Hybridization) -> usize {
    HYBRIDIZATIONS
        .iter()
        .position(|&h| h == hyb)
        .unwrap_or(0)
}
