//! Structure readers.
//!
//! - [`inchi`] – standard InChI strings, the dataset input format.
//! - [`sdf`] – the first MDL V2000 block of an SD file or molfile.
//!
//! Every reader returns a sanitized [`Molecule`] with hydrogens counted on
//! their parent atoms; call [`crate::chem::add_hydrogens`] to make them graph
//! atoms.

use crate::model::molecule::Molecule;
use std::fmt;
use std::io::BufRead;

pub mod error;
pub mod inchi;
pub mod sdf;
mod util;

pub use error::Error;
pub use inchi::parse_inchi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Inchi,
    Sdf,
}

impl Format {
    /// What an error location counts in this format.
    fn location_unit(&self) -> &'static str {
        match self {
            Format::Inchi => "character",
            Format::Sdf => "line",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Inchi => write!(f, "InChI"),
            Format::Sdf => write!(f, "SDF"),
        }
    }
}

/// Reads one molecule in `format` from `reader`.
///
/// For InChI the first non-empty line is parsed.
pub fn read_molecule<R: BufRead>(reader: R, format: Format) -> Result<Molecule, Error> {
    match format {
        Format::Sdf => sdf::read(reader),
        Format::Inchi => {
            for line in reader.lines() {
                let line = line?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return parse_inchi(trimmed);
                }
            }
            Err(Error::parse(Format::Inchi, 1, "input contains no InChI string"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_molecule_takes_first_inchi_line() {
        let input = "\n  InChI=1S/CH4/h1H4\nInChI=1S/H2O/h1H2\n";
        let mol = read_molecule(Cursor::new(input), Format::Inchi).unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.atoms[0].symbol(), "C");
    }

    #[test]
    fn empty_inchi_input_is_an_error() {
        let err = read_molecule(Cursor::new("\n\n"), Format::Inchi).unwrap_err();
        assert!(matches!(err, Error::Parse { format: Format::Inchi, .. }));
    }

    #[test]
    fn parse_error_message_names_unit() {
        let err = Error::parse(Format::Sdf, 4, "bad counts");
        assert_eq!(err.to_string(), "failed to parse SDF data: bad counts (at line ~4)");
    }
}
