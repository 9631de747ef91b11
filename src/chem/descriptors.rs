//! Whole-molecule descriptors used as graph-level features.
//!
//! All functions accept molecules with hydrogens either counted on their
//! parents or present as graph atoms; both give the same value.

use crate::model::atom::Atom;
use crate::model::molecule::Molecule;
use crate::model::types::{BondOrder, Element};

/// Average molecular weight in g/mol, hydrogens included.
pub fn molecular_weight(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .map(|a| a.element.atomic_mass() + f64::from(a.attached_hydrogens()) * Element::H.atomic_mass())
        .sum()
}

/// Local bonding environment of a heavy atom, with bonds to hydrogen atoms
/// folded into the hydrogen count.
#[derive(Debug, Default)]
struct Environment {
    heavy: Vec<usize>,
    hydrogens: usize,
    single: usize,
    double: usize,
    triple: usize,
    aromatic: usize,
}

fn environment(mol: &Molecule, idx: usize) -> Environment {
    let mut env = Environment {
        hydrogens: usize::from(mol.atoms[idx].attached_hydrogens()),
        ..Default::default()
    };
    for bond in mol.bonds.iter().filter(|b| b.contains(idx)) {
        let Some(nbr) = bond.other(idx) else { continue };
        if mol.atoms[nbr].element.is_hydrogen() {
            env.hydrogens += 1;
            continue;
        }
        env.heavy.push(nbr);
        match bond.order {
            BondOrder::Single => env.single += 1,
            BondOrder::Double => env.double += 1,
            BondOrder::Triple => env.triple += 1,
            BondOrder::Aromatic => env.aromatic += 1,
        }
    }
    env
}

fn in_three_ring(mol: &Molecule, env: &Environment) -> bool {
    env.heavy
        .iter()
        .enumerate()
        .any(|(k, &a)| env.heavy[k + 1..].iter().any(|&b| mol.find_bond(a, b).is_some()))
}

/// Topological polar surface area (Å²) from Ertl's nitrogen and oxygen
/// fragment contributions.
pub fn tpsa(mol: &Molecule) -> f64 {
    (0..mol.atom_count())
        .map(|idx| match mol.atoms[idx].element {
            Element::N => nitrogen_psa(mol, idx),
            Element::O => oxygen_psa(mol, idx),
            _ => 0.0,
        })
        .sum()
}

fn nitrogen_psa(mol: &Molecule, idx: usize) -> f64 {
    let env = environment(mol, idx);
    let chg = mol.atoms[idx].formal_charge;
    let (h, s, d, t, a) = (env.hydrogens, env.single, env.double, env.triple, env.aromatic);
    let value = match (env.heavy.len(), h, chg) {
        (1, 0, 0) if t == 1 => Some(23.79),
        (1, 1, 0) if d == 1 => Some(23.85),
        (1, 2, 0) if s == 1 => Some(26.02),
        (1, 2, 1) if d == 1 => Some(25.59),
        (1, 3, 1) if s == 1 => Some(27.64),
        (2, 0, 0) if s == 1 && d == 1 => Some(12.36),
        (2, 0, 0) if t == 1 && d == 1 => Some(13.60),
        (2, 1, 0) if s == 2 => Some(if in_three_ring(mol, &env) { 21.94 } else { 12.03 }),
        (2, 0, 1) if t == 1 && s == 1 => Some(4.36),
        (2, 1, 1) if d == 1 && s == 1 => Some(13.97),
        (2, 2, 1) if s == 2 => Some(16.61),
        (2, 0, 0) if a == 2 => Some(12.89),
        (2, 1, 0) if a == 2 => Some(15.79),
        (2, 1, 1) if a == 2 => Some(14.14),
        (3, 0, 0) if s == 3 => Some(if in_three_ring(mol, &env) { 3.01 } else { 3.24 }),
        (3, 0, 0) if s == 1 && d == 2 => Some(11.68),
        (3, 0, 1) if s == 2 && d == 1 => Some(3.01),
        (3, 1, 1) if s == 3 => Some(4.44),
        (3, 0, 0) if a == 3 => Some(4.41),
        (3, 0, 0) if s == 1 && a == 2 => Some(4.93),
        (3, 0, 1) if a == 3 => Some(4.10),
        (3, 0, 1) if s == 1 && a == 2 => Some(3.88),
        (4, 0, 1) if s == 4 => Some(0.0),
        _ => None,
    };
    value.unwrap_or_else(|| (30.5 - 8.2 * env.heavy.len() as f64 + 1.5 * h as f64).max(0.0))
}

fn oxygen_psa(mol: &Molecule, idx: usize) -> f64 {
    let env = environment(mol, idx);
    let chg = mol.atoms[idx].formal_charge;
    let value = match (env.heavy.len(), env.hydrogens, chg) {
        (1, 0, 0) if env.double == 1 => Some(17.07),
        (1, 1, 0) if env.single == 1 => Some(20.23),
        (1, 0, -1) if env.single == 1 => Some(23.06),
        (2, 0, 0) if env.single == 2 => Some(if in_three_ring(mol, &env) { 12.53 } else { 9.23 }),
        (2, 0, 0) if env.aromatic == 2 => Some(13.14),
        _ => None,
    };
    value.unwrap_or_else(|| {
        (28.5 - 8.6 * env.heavy.len() as f64 + 1.5 * env.hydrogens as f64).max(0.0)
    })
}

/// Wildman–Crippen octanol/water partition coefficient.
///
/// Atom types follow the published classes for C, H, N, O, S, P and the
/// halogens; uncommon environments fall back to the per-element default
/// class. Hydrogens are typed by their parent whether or not they are graph
/// atoms.
pub fn crippen_logp(mol: &Molecule) -> f64 {
    let mut total = 0.0;
    for idx in 0..mol.atom_count() {
        let atom = &mol.atoms[idx];
        if atom.element.is_hydrogen() {
            let parent = mol.neighbors(idx).into_iter().next();
            total += hydrogen_logp(mol, parent);
            total += f64::from(atom.attached_hydrogens()) * hydrogen_logp(mol, Some(idx));
            continue;
        }
        total += heavy_logp(mol, idx);
        total += f64::from(atom.attached_hydrogens()) * hydrogen_logp(mol, Some(idx));
    }
    total
}

fn is_heteroatom(e: Element) -> bool {
    matches!(
        e,
        Element::N | Element::O | Element::P | Element::S | Element::F | Element::Cl | Element::Br | Element::I
    )
}

fn heavy_logp(mol: &Molecule, idx: usize) -> f64 {
    match mol.atoms[idx].element {
        Element::C => carbon_logp(mol, idx),
        Element::N => nitrogen_logp(mol, idx),
        Element::O => oxygen_logp(mol, idx),
        Element::S => {
            let atom = &mol.atoms[idx];
            if atom.is_aromatic {
                0.6237
            } else if atom.formal_charge != 0 {
                -0.0024
            } else {
                0.6482
            }
        }
        Element::P => 0.8612,
        Element::F => 0.4202,
        Element::Cl => 0.6895,
        Element::Br => 0.8456,
        Element::I => 0.8857,
        Element::Li | Element::Na | Element::K | Element::Rb | Element::Cs => -0.3808,
        Element::Be | Element::Mg | Element::Ca | Element::Sr | Element::Ba => -0.0025,
        _ => 0.0,
    }
}

fn carbon_logp(mol: &Molecule, idx: usize) -> f64 {
    let env = environment(mol, idx);
    let atom = &mol.atoms[idx];
    let nbrs: Vec<&Atom> = env.heavy.iter().map(|&n| &mol.atoms[n]).collect();
    let any_aromatic_nbr = nbrs.iter().any(|a| a.is_aromatic);

    if atom.is_aromatic {
        if env.hydrogens > 0 {
            return 0.1581;
        }
        let mut ring_nbrs = 0;
        let mut substituent = None;
        for bond in mol.bonds.iter().filter(|b| b.contains(idx)) {
            let Some(other) = bond.other(idx) else { continue };
            if mol.atoms[other].element.is_hydrogen() {
                continue;
            }
            if bond.order == BondOrder::Aromatic {
                ring_nbrs += 1;
            } else {
                substituent = Some((other, bond.order));
            }
        }
        return match substituent {
            None if ring_nbrs >= 3 => 0.2955,
            None => 0.08129,
            Some((other, order)) => {
                let sub = &mol.atoms[other];
                match (sub.element, order, sub.is_aromatic) {
                    (Element::F, ..) => 0.0,
                    (Element::Cl, ..) => 0.245,
                    (Element::Br, ..) => 0.198,
                    (Element::I, ..) => 0.0,
                    (Element::C | Element::N | Element::O, BondOrder::Double, _) => -0.8186,
                    (_, _, true) => 0.2713,
                    (Element::C, ..) => 0.136,
                    (Element::N, ..) => 0.4619,
                    (Element::O, ..) => 0.5437,
                    (Element::S, ..) => 0.1893,
                    _ => -0.5443,
                }
            }
        };
    }

    if env.triple > 0 {
        return 0.0017;
    }
    if env.double > 0 {
        let double_to_hetero = mol.bonds.iter().filter(|b| b.contains(idx)).any(|b| {
            b.order == BondOrder::Double
                && b.other(idx)
                    .is_some_and(|o| mol.atoms[o].element != Element::C)
        });
        if double_to_hetero {
            return -0.2783;
        }
        return if any_aromatic_nbr { 0.264 } else { 0.1551 };
    }

    let heavy = nbrs.len();
    if nbrs
        .iter()
        .any(|a| a.element != Element::C && !is_heteroatom(a.element))
    {
        return 0.2148;
    }
    if any_aromatic_nbr {
        return match env.hydrogens {
            3 if nbrs[0].element == Element::C => 0.08452,
            3 => -0.1444,
            2 => -0.0516,
            1 => 0.1193,
            _ => -0.0967,
        };
    }
    let hetero = nbrs.iter().filter(|a| is_heteroatom(a.element)).count();
    match (hetero, heavy) {
        (0, 0..=2) => 0.1441,
        (0, _) => 0.0,
        (_, 0..=2) => -0.2035,
        _ => -0.2051,
    }
}

fn nitrogen_logp(mol: &Molecule, idx: usize) -> f64 {
    let env = environment(mol, idx);
    let atom = &mol.atoms[idx];
    if atom.is_aromatic {
        return if atom.formal_charge == 0 { -0.3239 } else { -1.119 };
    }
    let any_aromatic_nbr = env.heavy.iter().any(|&n| mol.atoms[n].is_aromatic);
    if atom.formal_charge > 0 {
        if env.hydrogens > 0 {
            return -1.95;
        }
        return if env.triple > 0 { 0.2887 } else { -0.3396 };
    }
    if atom.formal_charge < 0 {
        return 0.2887;
    }
    if env.triple > 0 {
        return 0.01508;
    }
    if env.double > 0 {
        return if env.hydrogens > 0 { 0.08387 } else { 0.1836 };
    }
    match (env.hydrogens, env.heavy.len()) {
        (2, 1) if any_aromatic_nbr => -1.027,
        (2, 1) => -1.019,
        (1, 2) if any_aromatic_nbr => -0.5188,
        (1, 2) => -0.7096,
        (0, 3) if any_aromatic_nbr => -0.4458,
        (0, 3) => -0.3187,
        _ => -0.4806,
    }
}

fn oxygen_logp(mol: &Molecule, idx: usize) -> f64 {
    let env = environment(mol, idx);
    let atom = &mol.atoms[idx];
    if atom.is_aromatic {
        return 0.1552;
    }
    if atom.formal_charge < 0 && env.heavy.len() == 1 {
        let other = env.heavy[0];
        return match mol.atoms[other].element {
            Element::N => 0.0335,
            Element::S => -0.3339,
            Element::P => -1.189,
            Element::C if has_double_to_oxygen(mol, other) => -1.326,
            _ => -0.1188,
        };
    }
    if env.hydrogens > 0 {
        return -0.2893;
    }
    if env.double == 1 && env.heavy.len() == 1 {
        let other = env.heavy[0];
        let partner = &mol.atoms[other];
        return match partner.element {
            Element::N | Element::O => 0.0335,
            Element::C if partner.is_aromatic => 0.1788,
            Element::C => {
                let subs: Vec<usize> = mol
                    .neighbors(other)
                    .into_iter()
                    .filter(|&n| n != idx && !mol.atoms[n].element.is_hydrogen())
                    .collect();
                if subs.len() == 2 && subs.iter().all(|&n| mol.atoms[n].element != Element::C) {
                    0.4833
                } else if subs.iter().any(|&n| mol.atoms[n].is_aromatic) {
                    0.1129
                } else {
                    -0.1526
                }
            }
            Element::S => -0.3339,
            _ => -0.1188,
        };
    }
    if env.single == 2 {
        let aromatic_nbrs = env.heavy.iter().filter(|&&n| mol.atoms[n].is_aromatic).count();
        return if aromatic_nbrs > 0 { -0.4195 } else { -0.0684 };
    }
    -0.1188
}

fn has_double_to_oxygen(mol: &Molecule, idx: usize) -> bool {
    mol.bonds.iter().filter(|b| b.contains(idx)).any(|b| {
        b.order == BondOrder::Double && b.other(idx).is_some_and(|o| mol.atoms[o].element == Element::O)
    })
}

/// Contribution of one hydrogen attached to `parent`.
fn hydrogen_logp(mol: &Molecule, parent: Option<usize>) -> f64 {
    let Some(p) = parent else {
        return 0.1125;
    };
    match mol.atoms[p].element {
        Element::C | Element::H => 0.123,
        Element::N => 0.2142,
        Element::O => {
            let others: Vec<usize> = mol
                .neighbors(p)
                .into_iter()
                .filter(|&n| !mol.atoms[n].element.is_hydrogen())
                .collect();
            let Some(&other) = others.first() else {
                return -0.2677;
            };
            let o = &mol.atoms[other];
            match o.element {
                Element::N => 0.2142,
                Element::O | Element::S => 0.298,
                Element::C if o.is_aromatic => -0.2677,
                Element::C if has_double_bond(mol, other) => 0.298,
                _ => -0.2677,
            }
        }
        _ => -0.2677,
    }
}

fn has_double_bond(mol: &Molecule, idx: usize) -> bool {
    mol.bonds
        .iter()
        .any(|b| b.contains(idx) && b.order == BondOrder::Double)
}

/// Lipinski hydrogen-bond donors: N bearing hydrogen (neutral trivalent or
/// cationic tetravalent), neutral non-aromatic O or S with exactly one
/// hydrogen, and neutral aromatic N with one hydrogen.
pub fn num_h_donors(mol: &Molecule) -> usize {
    (0..mol.atom_count())
        .filter(|&idx| {
            let atom = &mol.atoms[idx];
            let hs = mol.total_hydrogens(idx);
            let valence = mol.total_valence(idx);
            match atom.element {
                Element::N if atom.is_aromatic => atom.formal_charge == 0 && hs == 1,
                Element::N => {
                    hs > 0
                        && ((atom.formal_charge == 0 && valence == 3)
                            || (atom.formal_charge == 1 && valence == 4))
                }
                Element::O | Element::S => !atom.is_aromatic && atom.formal_charge == 0 && hs == 1,
                _ => false,
            }
        })
        .count()
}
