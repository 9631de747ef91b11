//! Error type for chemistry perception.

use thiserror::Error;

/// Errors raised while sanitizing a molecule or computing its chemistry.
#[derive(Debug, Error)]
pub enum Error {
    /// A bond references a missing atom or joins an atom to itself.
    #[error("invalid bond between atoms {i} and {j}: {detail}")]
    InvalidBond { i: usize, j: usize, detail: String },

    /// The molecule contains no atoms.
    #[error("molecule is empty: at least one atom is required")]
    EmptyMolecule,

    /// An atom's bonding exceeds every valence allowed for its element and charge.
    #[error("explicit valence for atom {atom} ({symbol}) is invalid: {detail}")]
    Valence {
        atom: usize,
        symbol: &'static str,
        detail: String,
    },

    /// The Gasteiger parameter table could not be parsed.
    #[error("failed to parse partial charge parameters: {0}")]
    ParameterParse(#[from] toml::de::Error),
}

impl Error {
    pub fn invalid_bond(i: usize, j: usize, details: impl Into<String>) -> Self {
        Self::InvalidBond {
            i,
            j,
            detail: details.into(),
        }
    }

    pub fn valence(atom: usize, symbol: &'static str, details: impl Into<String>) -> Self {
        Self::Valence {
            atom,
            symbol,
            detail: details.into(),
        }
    }
}
