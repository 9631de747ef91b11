use super::error::Error;
use super::vocab::{ATOM_TYPES, CHIRALITIES, HYBRIDIZATIONS};
use super::vocab::{atom_type_index, chirality_index, hybridization_index};
use crate::model::molecule::Molecule;
use crate::model::types::{Chirality, Hybridization};
use ndarray::{Array1, ArrayViewMut1};

/// Length of an encoded atom feature vector.
pub const ATOM_FEATURE_DIM: usize =
    ATOM_TYPES.len() + CHIRALITIES.len() + 2 + HYBRIDIZATIONS.len() + 10;

/// The per-atom attributes that make up a node feature row, in encoding
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub symbol: &'static str,
    pub chirality: Chirality,
    pub explicit_valence: u32,
    pub formal_charge: i8,
    pub hybridization: Hybridization,
    pub degree: usize,
    pub implicit_valence: u32,
    pub is_aromatic: bool,
    pub explicit_hydrogens: u8,
    pub implicit_hydrogens: u8,
    pub radical_electrons: u8,
    pub in_ring: bool,
    pub atomic_mass: f64,
    pub vdw_radius: f64,
    /// Zero when charges have not been assigned.
    pub partial_charge: f64,
}

impl AtomRecord {
    pub fn from_atom(mol: &Molecule, idx: usize) -> Self {
        let atom = &mol.atoms[idx];
        Self {
            symbol: atom.symbol(),
            chirality: atom.chirality,
            explicit_valence: mol.explicit_valence(idx),
            formal_charge: atom.formal_charge,
            hybridization: atom.hybridization,
            degree: mol.degree(idx),
            implicit_valence: mol.implicit_valence(idx),
            is_aromatic: atom.is_aromatic,
            explicit_hydrogens: atom.explicit_hydrogens,
            implicit_hydrogens: atom.implicit_hydrogens,
            radical_electrons: atom.radical_electrons,
            in_ring: atom.in_ring,
            atomic_mass: atom.element.atomic_mass(),
            vdw_radius: atom.element.vdw_radius(),
            partial_charge: atom.partial_charge.unwrap_or(0.0),
        }
    }

    /// Writes the encoded record into `out`, which must hold
    /// [`ATOM_FEATURE_DIM`] values.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAtomType`] if the symbol is not in the atom type
    /// vocabulary.
    pub fn encode_into(&self, out: ArrayViewMut1<'_, f32>) -> Result<(), Error> {
        debug_assert_eq!(out.len(), ATOM_FEATURE_DIM);
        let type_index =
            atom_type_index(self.symbol).ok_or_else(|| Error::UnknownAtomType(self.symbol.to_string()))?;

        let mut w = Writer { out, pos: 0 };
        w.one_hot(type_index, ATOM_TYPES.len());
        w.one_hot(chirality_index(self.chirality), CHIRALITIES.len());
        w.push(self.explicit_valence as f32);
        w.push(f32::from(self.formal_charge));
        w.one_hot(hybridization_index(self.hybridization), HYBRIDIZATIONS.len());
        w.push(self.degree as f32);
        w.push(self.implicit_valence as f32);
        w.flag(self.is_aromatic);
        w.push(f32::from(self.explicit_hydrogens));
        w.push(f32::from(self.implicit_hydrogens));
        w.push(f32::from(self.radical_electrons));
        w.flag(self.in_ring);
        w.push(self.atomic_mass as f32);
        w.push(self.vdw_radius as f32);
        w.push(self.partial_charge as f32);
        debug_assert_eq!(w.pos, ATOM_FEATURE_DIM);
        Ok(())
    }

    pub fn encode(&self) -> Result<Array1<f32>, Error> {
        let mut row = Array1::zeros(ATOM_FEATURE_DIM);
        self.encode_into(row.view_mut())?;
        Ok(row)
    }
}

struct Writer<'a> {
    out: ArrayViewMut1<'a, f32>,
    pos: usize,
}

impl Writer<'_> {
    fn push(&mut self, value: f32) {
        self.out[self.pos] = value;
        self.pos += 1;
    }

    fn flag(&mut self, value: bool) {
        self.push(if value { 1.0 } else { 0.0 });
    }

    fn one_hot(&mut self, index: usize, len: usize) {
        for k in 0..len {
            self.push(if k == index { 1.0 } else { 0.0 });
        }
    }
}
