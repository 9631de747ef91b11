use crate::model::atom::Atom;
use crate::model::molecule::{Bond, Molecule};
use crate::model::types::{BondOrder, Element, Hybridization};
use tracing::debug;

/// Returns a copy of `mol` in which every counted hydrogen is a graph atom.
///
/// Hydrogens are appended after the existing atoms, grouped by parent in
/// parent order, each joined by a single bond. Parents keep their perceived
/// chemistry but lose their hydrogen counts and are marked `no_implicit`.
pub fn add_hydrogens(mol: &Molecule) -> Molecule {
    let added: usize = mol
        .atoms
        .iter()
        .map(|a| usize::from(a.attached_hydrogens()))
        .sum();

    let mut out = Molecule {
        atoms: Vec::with_capacity(mol.atom_count() + added),
        bonds: Vec::with_capacity(mol.bond_count() + added),
    };
    out.atoms.extend(mol.atoms.iter().cloned());
    out.bonds.extend(mol.bonds.iter().cloned());

    for parent in 0..mol.atom_count() {
        let count = mol.atoms[parent].attached_hydrogens();
        for _ in 0..count {
            let h_idx = out.atoms.len();
            out.atoms.push(new_hydrogen());
            out.bonds.push(Bond::new(parent, h_idx, BondOrder::Single));
        }
        let atom = &mut out.atoms[parent];
        atom.explicit_hydrogens = 0;
        atom.implicit_hydrogens = 0;
        atom.no_implicit = true;
    }

    debug!(
        heavy = mol.atom_count(),
        hydrogens = added,
        "added explicit hydrogens"
    );
    out
}

fn new_hydrogen() -> Atom {
    let mut h = Atom::new(Element::H);
    h.no_implicit = true;
    h.hybridization = Hybridization::S;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrogens_follow_parents_in_order() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::C).with_hydrogens(3));
        mol.atoms.push(Atom::new(Element::O).with_hydrogens(1));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Single));

        let full = add_hydrogens(&mol);
        assert_eq!(full.atom_count(), 6);
        assert_eq!(full.bond_count(), 5);
        assert!(full.atoms[2..].iter().all(|a| a.element == Element::H));
        assert_eq!(full.bonds[1], Bond::new(0, 2, BondOrder::Single));
        assert_eq!(full.bonds[4], Bond::new(1, 5, BondOrder::Single));
        assert_eq!(full.total_hydrogens(0), 3);
        assert_eq!(full.atoms[0].attached_hydrogens(), 0);
        assert_eq!(full.explicit_valence(0), 4);
    }

    #[test]
    fn input_is_left_untouched() {
        let mut mol = Molecule::new();
        let mut n = Atom::new(Element::N);
        n.implicit_hydrogens = 3;
        mol.atoms.push(n);

        let full = add_hydrogens(&mol);
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 3);
        assert_eq!(full.atom_count(), 4);
        assert!(full.atoms[1..].iter().all(|h| h.hybridization == Hybridization::S && !h.in_ring));
    }

    #[test]
    fn molecule_without_counts_is_copied() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::Na).with_charge(1));
        let full = add_hydrogens(&mol);
        assert_eq!(full.atoms.len(), 1);
        assert!(full.atoms[0].no_implicit);
    }
}
