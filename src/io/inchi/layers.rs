//! Tokenizers for the per-component InChI layers.
//!
//! Atom numbers in every layer are 1-based and local to their component;
//! the functions here return 0-based local indices.

use crate::model::types::Chirality;

/// Splits a layer into one segment per component. A `n*` prefix repeats its
/// segment for `n` consecutive components.
pub fn component_segments(body: &str) -> Result<Vec<&str>, String> {
    let mut segments = Vec::new();
    for raw in body.split(';') {
        match raw.split_once('*') {
            Some((count, rest)) if count.chars().all(|c| c.is_ascii_digit()) && !count.is_empty() => {
                let n = count
                    .parse::<usize>()
                    .map_err(|_| format!("invalid segment multiplier '{count}'"))?;
                segments.extend(std::iter::repeat_n(rest, n));
            }
            Some(_) => return Err(format!("malformed segment multiplier in '{raw}'")),
            None => segments.push(raw),
        }
    }
    Ok(segments)
}

fn atom_index(number: usize, n_atoms: usize) -> Result<usize, String> {
    if number == 0 || number > n_atoms {
        Err(format!(
            "atom number {number} is outside the component (1..={n_atoms})"
        ))
    } else {
        Ok(number - 1)
    }
}

fn read_number(chars: &[char], pos: &mut usize) -> Option<usize> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        return None;
    }
    chars[start..*pos].iter().collect::<String>().parse().ok()
}

/// Bonds of one `/c` segment, deduplicated, as `(smaller, larger)` local
/// index pairs in first-seen order.
pub fn parse_connections(segment: &str, n_atoms: usize) -> Result<Vec<(usize, usize)>, String> {
    let chars: Vec<char> = segment.chars().collect();
    let mut bonds: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut branches: Vec<Option<usize>> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        match chars[pos] {
            c if c.is_ascii_digit() => {
                let number = read_number(&chars, &mut pos)
                    .ok_or_else(|| format!("invalid atom number in '{segment}'"))?;
                let atom = atom_index(number, n_atoms)?;
                if let Some(prev) = current {
                    if prev == atom {
                        return Err(format!("atom {number} is bonded to itself"));
                    }
                    let key = (prev.min(atom), prev.max(atom));
                    if !bonds.contains(&key) {
                        bonds.push(key);
                    }
                }
                current = Some(atom);
                continue;
            }
            '-' => {}
            '(' => branches.push(current),
            ',' => {
                current = *branches
                    .last()
                    .ok_or_else(|| format!("',' outside a branch in '{segment}'"))?;
            }
            ')' => {
                current = branches
                    .pop()
                    .ok_or_else(|| format!("unbalanced ')' in '{segment}'"))?;
            }
            other => return Err(format!("unexpected '{other}' in connection layer")),
        }
        pos += 1;
    }

    if !branches.is_empty() {
        return Err(format!("unclosed '(' in '{segment}'"));
    }
    Ok(bonds)
}

/// A mobile hydrogen group `(H[n][-],a,b,...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileGroup {
    pub hydrogens: u8,
    pub atoms: Vec<usize>,
    pub charged: bool,
}

/// Hydrogens of one `/h` segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrogenLayer {
    /// Fixed hydrogen counts per local atom index.
    pub fixed: Vec<(usize, u8)>,
    pub mobile: Vec<MobileGroup>,
}

pub fn parse_hydrogens(segment: &str, n_atoms: usize) -> Result<HydrogenLayer, String> {
    let chars: Vec<char> = segment.chars().collect();
    let mut layer = HydrogenLayer::default();
    let mut pending: Vec<usize> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        match chars[pos] {
            c if c.is_ascii_digit() => {
                let atoms = read_atom_list_item(&chars, &mut pos, n_atoms)?;
                pending.extend(atoms);
            }
            ',' => pos += 1,
            'H' => {
                pos += 1;
                let count = read_number(&chars, &mut pos).unwrap_or(1);
                let count = u8::try_from(count).map_err(|_| format!("hydrogen count {count} is too large"))?;
                if pending.is_empty() {
                    return Err(format!("hydrogen count without atoms in '{segment}'"));
                }
                layer.fixed.extend(pending.drain(..).map(|a| (a, count)));
            }
            '(' => {
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ')')
                    .map(|off| pos + off)
                    .ok_or_else(|| format!("unclosed mobile group in '{segment}'"))?;
                let inner: String = chars[pos + 1..close].iter().collect();
                layer.mobile.push(parse_mobile_group(&inner, n_atoms)?);
                pos = close + 1;
            }
            other => return Err(format!("unexpected '{other}' in hydrogen layer")),
        }
    }

    if !pending.is_empty() {
        return Err(format!("atoms without a hydrogen count in '{segment}'"));
    }
    Ok(layer)
}

/// Reads `a` or `a-b` starting at a digit.
fn read_atom_list_item(chars: &[char], pos: &mut usize, n_atoms: usize) -> Result<Vec<usize>, String> {
    let first = read_number(chars, pos).ok_or("expected an atom number")?;
    let first = atom_index(first, n_atoms)?;
    if *pos + 1 < chars.len() && chars[*pos] == '-' && chars[*pos + 1].is_ascii_digit() {
        *pos += 1;
        let last = read_number(chars, pos).ok_or("expected the end of an atom range")?;
        let last = atom_index(last, n_atoms)?;
        if last < first {
            return Err(format!("descending atom range {}-{}", first + 1, last + 1));
        }
        return Ok((first..=last).collect());
    }
    Ok(vec![first])
}

fn parse_mobile_group(inner: &str, n_atoms: usize) -> Result<MobileGroup, String> {
    let mut parts = inner.split(',');
    let head = parts.next().unwrap_or_default();
    let rest = head
        .strip_prefix('H')
        .ok_or_else(|| format!("mobile group must start with H: '({inner})'"))?;
    let (count_text, charged) = match rest.strip_suffix('-') {
        Some(c) => (c, true),
        None => (rest, false),
    };
    let hydrogens = if count_text.is_empty() {
        1
    } else {
        count_text
            .parse::<u8>()
            .map_err(|_| format!("invalid mobile hydrogen count in '({inner})'"))?
    };

    let mut atoms = Vec::new();
    for part in parts {
        let chars: Vec<char> = part.chars().collect();
        let mut pos = 0;
        atoms.extend(read_atom_list_item(&chars, &mut pos, n_atoms)?);
        if pos != chars.len() {
            return Err(format!("invalid atom '{part}' in mobile group"));
        }
    }
    if atoms.is_empty() {
        return Err(format!("mobile group lists no atoms: '({inner})'"));
    }
    Ok(MobileGroup {
        hydrogens,
        atoms,
        charged,
    })
}

/// Net charge of one `/q` segment (`+1`, `-2`, or empty for neutral).
pub fn parse_charge(segment: &str) -> Result<i32, String> {
    if segment.is_empty() {
        return Ok(0);
    }
    let (sign, digits) = match segment.as_bytes()[0] {
        b'+' => (1, &segment[1..]),
        b'-' => (-1, &segment[1..]),
        _ => (1, segment),
    };
    let magnitude = if digits.is_empty() {
        1
    } else {
        digits
            .parse::<i32>()
            .map_err(|_| format!("invalid charge '{segment}'"))?
    };
    Ok(sign * magnitude)
}

/// Tetrahedral parities of one `/t` segment. `-` and `+` map to
/// counter-clockwise and clockwise tags; unknown (`?`) and undefined (`u`)
/// parities stay unspecified.
pub fn parse_parities(segment: &str, n_atoms: usize) -> Result<Vec<(usize, Chirality)>, String> {
    let mut parities = Vec::new();
    for item in segment.split(',').filter(|s| !s.is_empty()) {
        let split = item
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("stereo item '{item}' has no parity"))?;
        let (number, mark) = item.split_at(split);
        let number = number
            .parse::<usize>()
            .map_err(|_| format!("invalid stereo atom in '{item}'"))?;
        let atom = atom_index(number, n_atoms)?;
        let tag = match mark {
            "-" => Chirality::TetrahedralCcw,
            "+" => Chirality::TetrahedralCw,
            "?" | "u" => Chirality::Unspecified,
            _ => return Err(format!("unknown parity '{mark}'")),
        };
        parities.push((atom, tag));
    }
    Ok(parities)
}

/// Per-component inversion flags of the `/m` layer. A single flag applies to
/// every component.
pub fn parse_inversion(body: &str) -> Result<Vec<bool>, String> {
    body.split('.')
        .filter(|s| !s.is_empty())
        .map(|flag| match flag {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(format!("invalid inversion flag '{other}'")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_expand_multipliers() {
        assert_eq!(component_segments("1-2;;3*1H").unwrap(), vec!["1-2", "", "1H", "1H", "1H"]);
        assert!(component_segments("x*1").is_err());
    }

    #[test]
    fn chain_branch_and_ring() {
        // acetic acid: 1-2(3)4
        assert_eq!(parse_connections("1-2(3)4", 4).unwrap(), vec![(0, 1), (1, 2), (1, 3)]);
        // cyclopropane closure
        assert_eq!(parse_connections("1-2-3-1", 3).unwrap(), vec![(0, 1), (1, 2), (0, 2)]);
        // neopentane: 1-5(2,3)4
        assert_eq!(
            parse_connections("1-5(2,3)4", 5).unwrap(),
            vec![(0, 4), (1, 4), (2, 4), (3, 4)]
        );
    }

    #[test]
    fn nested_branches() {
        let bonds = parse_connections("1-2(3-4,5)6", 6).unwrap();
        assert_eq!(bonds, vec![(0, 1), (1, 2), (2, 3), (1, 4), (1, 5)]);
    }

    #[test]
    fn connection_errors() {
        assert!(parse_connections("1-9", 3).is_err());
        assert!(parse_connections("1(2", 3).is_err());
        assert!(parse_connections("1)2", 3).is_err());
        assert!(parse_connections("1-1", 3).is_err());
    }

    #[test]
    fn hydrogen_counts_with_lists_and_ranges() {
        let layer = parse_hydrogens("3H,2H2,1H3", 3).unwrap();
        assert_eq!(layer.fixed, vec![(2, 1), (1, 2), (0, 3)]);

        let layer = parse_hydrogens("1-3,5H2", 5).unwrap();
        assert_eq!(layer.fixed, vec![(0, 2), (1, 2), (2, 2), (4, 2)]);
    }

    #[test]
    fn mobile_groups() {
        let layer = parse_hydrogens("1H3,(H,3,4)", 4).unwrap();
        assert_eq!(layer.fixed, vec![(0, 3)]);
        assert_eq!(layer.mobile, vec![MobileGroup {
            hydrogens: 1,
            atoms: vec![2, 3],
            charged: false,
        }]);

        let layer = parse_hydrogens("(H2,1,2,3)(H-,4,5)", 5).unwrap();
        assert_eq!(layer.mobile.len(), 2);
        assert_eq!(layer.mobile[0].hydrogens, 2);
        assert!(layer.mobile[1].charged);
    }

    #[test]
    fn hydrogen_errors() {
        assert!(parse_hydrogens("1", 2).is_err());
        assert!(parse_hydrogens("H2", 2).is_err());
        assert!(parse_hydrogens("(H,1", 2).is_err());
        assert!(parse_hydrogens("4H", 2).is_err());
    }

    #[test]
    fn charges() {
        assert_eq!(parse_charge("").unwrap(), 0);
        assert_eq!(parse_charge("+1").unwrap(), 1);
        assert_eq!(parse_charge("-2").unwrap(), -2);
        assert!(parse_charge("+x").is_err());
    }

    #[test]
    fn parities_and_inversion() {
        let parities = parse_parities("2-,3+,4?", 4).unwrap();
        assert_eq!(parities, vec![
            (1, Chirality::TetrahedralCcw),
            (2, Chirality::TetrahedralCw),
            (3, Chirality::Unspecified),
        ]);
        assert!(parse_parities("2", 4).is_err());
        assert_eq!(parse_inversion("1").unwrap(), vec![true]);
        assert_eq!(parse_inversion("0.1").unwrap(), vec![false, true]);
    }
}
