//! Chemistry perception on [`Molecule`]s.
//!
//! Structure readers produce bare connectivity: elements, charges, bond
//! orders and, for InChI, hydrogen counts. [`sanitize`] completes that into
//! the per-atom chemistry the featurizer reads:
//!
//! 1. bond validation,
//! 2. implicit hydrogens from default valences,
//! 3. ring membership and smallest rings,
//! 4. Hückel aromaticity,
//! 5. hybridization.
//!
//! Further steps operate on a sanitized molecule: [`add_hydrogens`] turns
//! counted hydrogens into graph atoms, [`assign_gasteiger_charges`] computes
//! partial charges and the [`descriptors`] summarize the whole molecule.

mod aromaticity;
mod charge;
pub mod descriptors;
mod error;
mod hybridization;
mod hydrogens;
mod rings;
mod valence;

pub use charge::{
    ElectronegativityParams, GasteigerConfig, GasteigerParams, assign_gasteiger_charges,
};
pub use error::Error;
pub use hydrogens::add_hydrogens;
pub use rings::Ring;

use crate::model::molecule::Molecule;
use crate::model::types::BondOrder;
use std::collections::HashSet;
use tracing::debug;

/// Validates a molecule and perceives hydrogens, rings, aromaticity and
/// hybridization in place.
///
/// Safe to call more than once: hydrogen counts on `no_implicit` atoms are
/// never changed, and perception is recomputed from the current bonds.
///
/// # Errors
///
/// - [`Error::EmptyMolecule`] if there are no atoms.
/// - [`Error::InvalidBond`] for out-of-range, self or duplicate bonds.
/// - [`Error::Valence`] if an organic-subset atom exceeds every allowed
///   valence.
pub fn sanitize(mol: &mut Molecule) -> Result<(), Error> {
    if mol.atoms.is_empty() {
        return Err(Error::EmptyMolecule);
    }
    validate_bonds(mol)?;

    // Aromatic bonds read from a file mark their atoms before valences are
    // checked, so that fused ring carbons are not seen as pentavalent.
    for bi in 0..mol.bond_count() {
        if mol.bonds[bi].order == BondOrder::Aromatic {
            let (b, e) = (mol.bonds[bi].begin, mol.bonds[bi].end);
            mol.atoms[b].is_aromatic = true;
            mol.atoms[e].is_aromatic = true;
        }
    }

    valence::assign_implicit_hydrogens(mol)?;

    let ring_flags = rings::ring_bonds(mol);
    rings::assign_ring_membership(mol, &ring_flags);
    let smallest = rings::smallest_rings(mol, &ring_flags);
    aromaticity::perceive_aromaticity(mol, &smallest);
    hybridization::assign_hybridization(mol);

    debug!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        rings = smallest.len(),
        aromatic = mol.atoms.iter().filter(|a| a.is_aromatic).count(),
        "sanitized molecule"
    );
    Ok(())
}

/// The smallest ring through each ring bond of `mol`.
pub fn find_rings(mol: &Molecule) -> Vec<Ring> {
    let flags = rings::ring_bonds(mol);
    rings::smallest_rings(mol, &flags)
}

fn validate_bonds(mol: &Molecule) -> Result<(), Error> {
    let n = mol.atom_count();
    let mut seen = HashSet::with_capacity(mol.bond_count());
    for bond in &mol.bonds {
        let (i, j) = (bond.begin, bond.end);
        if i >= n || j >= n {
            return Err(Error::invalid_bond(
                i,
                j,
                format!("atom index out of range for {n} atoms"),
            ));
        }
        if i == j {
            return Err(Error::invalid_bond(i, j, "self-bond detected"));
        }
        if !seen.insert((i.min(j), i.max(j))) {
            return Err(Error::invalid_bond(i, j, "duplicate bond"));
        }
    }
    Ok(())
}
