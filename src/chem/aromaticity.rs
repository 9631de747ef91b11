//! Hückel aromaticity over the smallest rings and fused ring pairs.

use super::rings::Ring;
use crate::model::molecule::Molecule;
use crate::model::types::{BondOrder, Element};
use std::collections::BTreeSet;
use tracing::trace;

/// A ring, or a union of two rings sharing a bond, tested as one π system.
struct RingSystem {
    atoms: BTreeSet<usize>,
    bonds: BTreeSet<usize>,
}

impl RingSystem {
    fn from_ring(ring: &Ring) -> Self {
        Self {
            atoms: ring.atoms.iter().copied().collect(),
            bonds: ring.bonds.iter().copied().collect(),
        }
    }

    fn fused(a: &Ring, b: &Ring) -> Option<Self> {
        if !a.bonds.iter().any(|bond| b.contains_bond(*bond)) {
            return None;
        }
        let mut system = Self::from_ring(a);
        system.atoms.extend(b.atoms.iter().copied());
        system.bonds.extend(b.bonds.iter().copied());
        // Shared bonds are interior to the union.
        for bond in a.bonds.iter().filter(|bond| b.contains_bond(**bond)) {
            system.bonds.remove(bond);
        }
        Some(system)
    }
}

/// Perceives aromatic rings and marks their atoms and bonds.
///
/// Rings whose bonds are all already aromatic (as read from a structure
/// file) are trusted. Localized rings are kept aromatic when their π
/// electron count satisfies 4n + 2; fused pairs are tested as a union so
/// that Kekulé structures with cross-ring double bonds are recognized.
pub fn perceive_aromaticity(mol: &mut Molecule, rings: &[Ring]) {
    let mut aromatic_atoms: BTreeSet<usize> = BTreeSet::new();
    let mut aromatic_bonds: BTreeSet<usize> = BTreeSet::new();
    let adj = mol.adjacency();
    let in_any_ring: Vec<bool> = mol.atoms.iter().map(|a| a.in_ring).collect();

    let mut systems: Vec<RingSystem> = rings.iter().map(RingSystem::from_ring).collect();
    for (i, a) in rings.iter().enumerate() {
        for b in &rings[i + 1..] {
            if let Some(system) = RingSystem::fused(a, b) {
                systems.push(system);
            }
        }
    }

    for (si, system) in systems.iter().enumerate() {
        let all_aromatic = system
            .bonds
            .iter()
            .all(|&bi| mol.bonds[bi].order == BondOrder::Aromatic);
        let is_aromatic = if si < rings.len() && all_aromatic {
            true
        } else {
            pi_electrons(mol, &adj, &in_any_ring, system).is_some_and(|e| e >= 2 && (e - 2) % 4 == 0)
        };
        if is_aromatic {
            trace!(atoms = ?system.atoms, "aromatic ring system");
            aromatic_atoms.extend(system.atoms.iter().copied());
            aromatic_bonds.extend(system.bonds.iter().copied());
            if si >= rings.len() {
                // Interior bonds of a fused pair are aromatic too.
                for ring in rings.iter().filter(|r| r.atoms.iter().all(|a| system.atoms.contains(a))) {
                    aromatic_bonds.extend(ring.bonds.iter().copied());
                }
            }
        }
    }

    for &idx in &aromatic_atoms {
        mol.atoms[idx].is_aromatic = true;
    }
    for &bi in &aromatic_bonds {
        mol.bonds[bi].order = BondOrder::Aromatic;
    }
}

/// Total π electrons of a ring system, or `None` when an atom cannot take
/// part in an aromatic ring.
fn pi_electrons(
    mol: &Molecule,
    adj: &[Vec<(usize, usize)>],
    in_any_ring: &[bool],
    system: &RingSystem,
) -> Option<u32> {
    let mut total = 0;
    for &idx in &system.atoms {
        total += atom_pi_electrons(mol, adj, in_any_ring, system, idx)?;
    }
    Some(total)
}

fn atom_pi_electrons(
    mol: &Molecule,
    adj: &[Vec<(usize, usize)>],
    in_any_ring: &[bool],
    system: &RingSystem,
    idx: usize,
) -> Option<u32> {
    let atom = &mol.atoms[idx];
    if !matches!(
        atom.element,
        Element::B
            | Element::C
            | Element::N
            | Element::O
            | Element::P
            | Element::S
            | Element::As
            | Element::Se
            | Element::Te
    ) {
        return None;
    }

    let mut ring_double = false;
    let mut fused_double = false;
    let mut exocyclic_hetero_double = false;
    for &(nbr, bi) in &adj[idx] {
        match mol.bonds[bi].order {
            BondOrder::Triple => return None,
            BondOrder::Double => {
                if system.bonds.contains(&bi) {
                    ring_double = true;
                } else if in_any_ring[nbr] {
                    fused_double = true;
                } else if matches!(mol.atoms[nbr].element, Element::O | Element::N | Element::S) {
                    exocyclic_hetero_double = true;
                } else {
                    return None;
                }
            }
            BondOrder::Aromatic => ring_double = true,
            BondOrder::Single => {}
        }
    }

    if ring_double || fused_double {
        return Some(1);
    }
    if exocyclic_hetero_double {
        return Some(0);
    }

    let connections = mol.degree(idx) + usize::from(atom.attached_hydrogens());
    match (atom.element, atom.formal_charge) {
        (Element::C, -1) => Some(2),
        (Element::C, 1) => Some(0),
        (Element::B, 0) if connections == 3 => Some(0),
        (Element::N | Element::P | Element::As, 0) if connections == 3 => Some(2),
        (Element::N, -1) if connections == 2 => Some(2),
        (Element::O | Element::S | Element::Se | Element::Te, 0) if connections == 2 => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::rings::{assign_ring_membership, ring_bonds, smallest_rings};
    use crate::chem::valence::assign_implicit_hydrogens;
    use crate::model::atom::Atom;
    use crate::model::molecule::Bond;

    fn ring_molecule(elements: &[Element], orders: &[BondOrder]) -> Molecule {
        let mut mol = Molecule::new();
        for &e in elements {
            mol.atoms.push(Atom::new(e));
        }
        let n = elements.len();
        for (i, &order) in orders.iter().enumerate() {
            mol.bonds.push(Bond::new(i, (i + 1) % n, order));
        }
        mol
    }

    fn perceive(mol: &mut Molecule) {
        assign_implicit_hydrogens(mol).unwrap();
        let flags = ring_bonds(mol);
        assign_ring_membership(mol, &flags);
        let rings = smallest_rings(mol, &flags);
        perceive_aromaticity(mol, &rings);
    }

    use BondOrder::{Double as D, Single as S};

    #[test]
    fn kekule_benzene_is_aromatic() {
        let mut mol = ring_molecule(&[Element::C; 6], &[D, S, D, S, D, S]);
        perceive(&mut mol);
        assert!(mol.atoms.iter().all(|a| a.is_aromatic));
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert!(mol.atoms.iter().all(|a| a.implicit_hydrogens == 1));
    }

    #[test]
    fn cyclohexane_is_not_aromatic() {
        let mut mol = ring_molecule(&[Element::C; 6], &[S; 6]);
        perceive(&mut mol);
        assert!(mol.atoms.iter().all(|a| !a.is_aromatic));
        assert!(mol.atoms.iter().all(|a| a.in_ring));
    }

    #[test]
    fn pyrrole_nitrogen_donates_a_pair() {
        let mut mol = ring_molecule(
            &[Element::N, Element::C, Element::C, Element::C, Element::C],
            &[S, D, S, D, S],
        );
        perceive(&mut mol);
        assert!(mol.atoms.iter().all(|a| a.is_aromatic));
        assert_eq!(mol.atoms[0].implicit_hydrogens, 1);
        assert_eq!(mol.explicit_valence(0), 2);
        assert_eq!(mol.total_valence(0), 3);
    }

    #[test]
    fn cyclopentadiene_is_not_aromatic() {
        let mut mol = ring_molecule(&[Element::C; 5], &[S, D, S, D, S]);
        perceive(&mut mol);
        assert!(mol.atoms.iter().all(|a| !a.is_aromatic));
    }

    #[test]
    fn naphthalene_with_cross_ring_double_bonds() {
        // Ring A: 0-1-2-3-4-5, ring B: 4-6-7-8-9-5, fused on 4-5.
        let mut mol = Molecule::new();
        for _ in 0..10 {
            mol.atoms.push(Atom::new(Element::C));
        }
        let bonds = [
            (0, 1, D),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (4, 6, S),
            (6, 7, D),
            (7, 8, S),
            (8, 9, D),
            (9, 5, S),
        ];
        for (a, b, o) in bonds {
            mol.bonds.push(Bond::new(a, b, o));
        }
        perceive(&mut mol);
        assert!(mol.atoms.iter().all(|a| a.is_aromatic));
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert_eq!(mol.explicit_valence(4), 4);
    }

    #[test]
    fn aromatic_bonds_from_file_are_trusted() {
        let mut mol = ring_molecule(&[Element::C; 6], &[BondOrder::Aromatic; 6]);
        for atom in &mut mol.atoms {
            atom.is_aromatic = true;
        }
        perceive(&mut mol);
        assert!(mol.atoms.iter().all(|a| a.is_aromatic && a.implicit_hydrogens == 1));
    }
}
