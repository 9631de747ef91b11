use crate::chem;
use crate::io::{Format, error::Error, util};
use crate::model::{
    atom::Atom,
    molecule::{Bond, Molecule},
};
use std::io::BufRead;
use tracing::debug;

pub fn read<R: BufRead>(reader: R) -> Result<Molecule, Error> {
    let lines = collect_first_block(reader)?;
    if lines.len() < 4 {
        return Err(Error::parse(
            Format::Sdf,
            1,
            "SDF block must contain at least a header and counts line",
        ));
    }

    let counts_line_no = lines[3].0;
    let counts_line = &lines[3].1;
    if counts_line.contains("V3000") {
        return Err(Error::parse(
            Format::Sdf,
            counts_line_no,
            "V3000 is not supported",
        ));
    }

    let (atom_count, bond_count) = parse_counts(counts_line, counts_line_no)?;
    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;

    if lines.len() < props_start {
        return Err(Error::parse(
            Format::Sdf,
            lines.last().map(|(ln, _)| *ln).unwrap_or(counts_line_no),
            "SDF block ended before atoms/bonds were fully specified",
        ));
    }

    let mut atoms = parse_atoms(&lines[atom_start..bond_start])?;
    let bonds = parse_bonds(&lines[bond_start..props_start], atom_count)?;
    apply_properties(&lines[props_start..], &mut atoms)?;

    let mut mol = Molecule { atoms, bonds };
    chem::sanitize(&mut mol)?;
    debug!(
        title = lines[0].1.trim(),
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "read SDF block"
    );
    Ok(mol)
}

fn collect_first_block<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let content = line?;
        let ln = i + 1;
        if content.trim() == "$$$$" && !lines.is_empty() {
            break;
        }
        lines.push((ln, content));
    }
    Ok(lines)
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Error> {
    let fixed = line.get(0..3).zip(line.get(3..6)).and_then(|(a, b)| {
        Some((a.trim().parse::<usize>().ok()?, b.trim().parse::<usize>().ok()?))
    });
    if let Some(counts) = fixed {
        return Ok(counts);
    }

    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::parse(
            Format::Sdf,
            line_no,
            "counts line must contain atom and bond counts",
        ));
    }
    let atoms = tokens[0]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid atom count"))?;
    let bonds = tokens[1]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn parse_atoms(lines: &[(usize, String)]) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let padded = format!("{raw:<39}");
        for (axis, range) in [("x", 0..10), ("y", 10..20), ("z", 20..30)] {
            padded[range].trim().parse::<f64>().map_err(|_| {
                Error::parse(Format::Sdf, *ln, format!("invalid {axis} coordinate in atom line"))
            })?;
        }
        let element_token = padded[31..34].trim();
        let element = util::guess_element_symbol(element_token).ok_or_else(|| {
            Error::parse(
                Format::Sdf,
                *ln,
                format!("unable to infer element symbol from '{element_token}'"),
            )
        })?;

        let charge_code = match padded[36..39].trim() {
            "" => 0,
            field => field
                .parse::<i32>()
                .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid charge field in atom line"))?,
        };
        let charge = util::charge_from_ctfile(charge_code)
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "unsupported charge code in atom line"))?;

        let mut atom = Atom::new(element).with_charge(charge);
        if charge_code == 4 {
            atom.radical_electrons = 1;
        }
        atoms.push(atom);
    }
    Ok(atoms)
}

fn parse_bonds(lines: &[(usize, String)], atom_count: usize) -> Result<Vec<Bond>, Error> {
    let mut bonds = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let padded = format!("{raw:<9}");
        let fields = [padded[0..3].trim(), padded[3..6].trim(), padded[6..9].trim()];
        let tokens: Vec<&str> = if fields.iter().all(|f| !f.is_empty()) {
            fields.to_vec()
        } else {
            raw.split_whitespace().collect()
        };
        if tokens.len() < 3 {
            return Err(Error::parse(Format::Sdf, *ln, "invalid bond line"));
        }

        let a1 = tokens[0]
            .parse::<usize>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid first atom index"))?;
        let a2 = tokens[1]
            .parse::<usize>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid second atom index"))?;
        let order_val = tokens[2]
            .parse::<i32>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid bond order value"))?;

        let order = util::bond_order_from_ctfile(order_val)
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "unsupported bond order in bond line"))?;

        if a1 == 0 || a2 == 0 || a1 > atom_count || a2 > atom_count {
            return Err(Error::parse(
                Format::Sdf,
                *ln,
                "bond references atom outside declared range",
            ));
        }

        bonds.push(Bond::new(a1 - 1, a2 - 1, order));
    }
    Ok(bonds)
}

/// Applies `M  CHG`, `M  RAD` and `M  ISO` lines up to `M  END`. The first
/// `M  CHG` line resets every charge read from the atom block.
fn apply_properties(lines: &[(usize, String)], atoms: &mut [Atom]) -> Result<(), Error> {
    let mut charges_reset = false;
    for (ln, raw) in lines {
        let line = raw.trim_end();
        if line.starts_with("M  END") {
            break;
        }
        let Some(tag) = line.get(0..6) else {
            continue;
        };
        if !matches!(tag, "M  CHG" | "M  RAD" | "M  ISO") {
            continue;
        }

        let values: Vec<i32> = line[6..]
            .split_whitespace()
            .map(|t| t.parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| Error::parse(Format::Sdf, *ln, format!("invalid value in '{tag}' line")))?;
        let Some((&count, pairs)) = values.split_first() else {
            return Err(Error::parse(Format::Sdf, *ln, format!("empty '{tag}' line")));
        };
        if count < 0 || pairs.len() < 2 * count as usize {
            return Err(Error::parse(
                Format::Sdf,
                *ln,
                format!("'{tag}' line declares {count} entries but lists fewer"),
            ));
        }

        if tag == "M  CHG" && !charges_reset {
            for atom in atoms.iter_mut() {
                atom.formal_charge = 0;
            }
            charges_reset = true;
        }

        for pair in pairs.chunks_exact(2).take(count as usize) {
            let (idx, value) = (pair[0], pair[1]);
            let atom = usize::try_from(idx)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| atoms.get_mut(i))
                .ok_or_else(|| {
                    Error::parse(Format::Sdf, *ln, format!("'{tag}' references missing atom {idx}"))
                })?;
            match tag {
                "M  CHG" => {
                    atom.formal_charge = i8::try_from(value).map_err(|_| {
                        Error::parse(Format::Sdf, *ln, format!("charge {value} out of range"))
                    })?;
                }
                "M  RAD" => {
                    atom.radical_electrons = util::radicals_from_ctfile(value).ok_or_else(|| {
                        Error::parse(Format::Sdf, *ln, format!("unsupported radical code {value}"))
                    })?;
                }
                _ => {
                    atom.isotope = u16::try_from(value).ok();
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{BondOrder, Element};
    use std::io::Cursor;

    const ETHANOL: &str = "ethanol
  hand-written

  3  2  0  0  0  0  0  0  0  0999 V2000
   -0.8883    0.1670    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    0.4620   -0.5126    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.4845    0.4699    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  1  0
M  END
$$$$
";

    #[test]
    fn reads_ethanol_with_implicit_hydrogens() {
        let mol = read(Cursor::new(ETHANOL)).unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bonds, vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(1, 2, BondOrder::Single),
        ]);
        let hs: Vec<u8> = mol.atoms.iter().map(|a| a.implicit_hydrogens).collect();
        assert_eq!(hs, vec![3, 2, 1]);
    }

    #[test]
    fn charge_lines_override_atom_block() {
        let input = "acetate


  4  3  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0
    1.5000    0.0000    0.0000 C   0  0
    2.2000    1.2000    0.0000 O   0  0
    2.2000   -1.2000    0.0000 O   0  3
  1  2  1  0
  2  3  2  0
  2  4  1  0
M  CHG  1   4  -1
M  END
";
        let mol = read(Cursor::new(input)).unwrap();
        assert_eq!(mol.atoms[3].formal_charge, -1);
        assert_eq!(mol.atoms[3].implicit_hydrogens, 0);
        assert_eq!(mol.formal_charge(), -1);
    }

    #[test]
    fn atom_block_charge_code_is_used_without_chg_lines() {
        let input = "ammonium


  1  0  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 N   0  3
M  END
";
        let mol = read(Cursor::new(input)).unwrap();
        assert_eq!(mol.atoms[0].element, Element::N);
        assert_eq!(mol.atoms[0].formal_charge, 1);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
    }

    #[test]
    fn v3000_is_rejected() {
        let input = "x\n\n\n  0  0  0     0  0            999 V3000\n";
        let err = read(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("V3000"));
    }

    #[test]
    fn truncated_block_is_rejected() {
        let input = "x\n\n\n  2  1  0  0  0  0  0  0  0  0999 V2000\n    0.0 0.0 0.0 C\n";
        assert!(matches!(
            read(Cursor::new(input)),
            Err(Error::Parse { format: Format::Sdf, .. })
        ));
    }

    #[test]
    fn bond_to_missing_atom_is_rejected() {
        let input = "x


  1  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0
  1  2  1  0
M  END
";
        let err = read(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("outside declared range"));
    }
}
