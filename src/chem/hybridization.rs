use super::valence::lone_pairs;
use crate::model::molecule::Molecule;
use crate::model::types::{BondOrder, Element, Hybridization};

/// Assigns a hybridization state to every atom from its steric number
/// (bonded neighbors and hydrogens plus lone pairs).
///
/// Aromatic atoms are SP2. A four-coordinate heteroatom whose lone pair is
/// conjugated with a neighboring multiple or aromatic bond (amide N, phenol
/// O) is also SP2.
pub fn assign_hybridization(mol: &mut Molecule) {
    let states: Vec<Hybridization> = (0..mol.atom_count())
        .map(|idx| hybridization_of(mol, idx))
        .collect();
    for (atom, state) in mol.atoms.iter_mut().zip(states) {
        atom.hybridization = state;
    }
}

fn hybridization_of(mol: &Molecule, idx: usize) -> Hybridization {
    let atom = &mol.atoms[idx];
    if atom.element.valence_electrons().is_none() {
        return Hybridization::Unspecified;
    }
    if atom.is_aromatic {
        return Hybridization::Sp2;
    }
    if atom.element.is_hydrogen() {
        return Hybridization::S;
    }

    let pairs = lone_pairs(mol, idx) as usize;
    let steric = mol.degree(idx) + usize::from(atom.attached_hydrogens()) + pairs;
    match steric {
        0 | 1 => Hybridization::S,
        2 => Hybridization::Sp,
        3 => Hybridization::Sp2,
        4 if pairs > 0 && has_conjugated_lone_pair(mol, idx) => Hybridization::Sp2,
        4 => Hybridization::Sp3,
        5 => Hybridization::Sp3d,
        6 => Hybridization::Sp3d2,
        _ => Hybridization::Unspecified,
    }
}

fn has_conjugated_lone_pair(mol: &Molecule, idx: usize) -> bool {
    if !matches!(
        mol.atoms[idx].element,
        Element::N | Element::O | Element::S | Element::P | Element::Se
    ) {
        return false;
    }
    if mol
        .bonds
        .iter()
        .filter(|b| b.contains(idx))
        .any(|b| b.order != BondOrder::Single)
    {
        return false;
    }
    mol.neighbors(idx).into_iter().any(|nbr| {
        mol.atoms[nbr].is_aromatic
            || mol
                .bonds
                .iter()
                .filter(|b| b.contains(nbr) && !b.contains(idx))
                .any(|b| matches!(b.order, BondOrder::Double | BondOrder::Triple | BondOrder::Aromatic))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::valence::assign_implicit_hydrogens;
    use crate::model::atom::Atom;
    use crate::model::molecule::Bond;

    fn build(elements: &[Element], bonds: &[(usize, usize, BondOrder)]) -> Molecule {
        let mut mol = Molecule::new();
        for &e in elements {
            mol.atoms.push(Atom::new(e));
        }
        for &(a, b, o) in bonds {
            mol.bonds.push(Bond::new(a, b, o));
        }
        assign_implicit_hydrogens(&mut mol).unwrap();
        assign_hybridization(&mut mol);
        mol
    }

    #[test]
    fn ethanol_is_all_sp3() {
        let mol = build(
            &[Element::C, Element::C, Element::O],
            &[(0, 1, BondOrder::Single), (1, 2, BondOrder::Single)],
        );
        assert!(mol.atoms.iter().all(|a| a.hybridization == Hybridization::Sp3));
    }

    #[test]
    fn acetonitrile_has_sp_centres() {
        let mol = build(
            &[Element::C, Element::C, Element::N],
            &[(0, 1, BondOrder::Single), (1, 2, BondOrder::Triple)],
        );
        assert_eq!(mol.atoms[0].hybridization, Hybridization::Sp3);
        assert_eq!(mol.atoms[1].hybridization, Hybridization::Sp);
        assert_eq!(mol.atoms[2].hybridization, Hybridization::Sp);
    }

    #[test]
    fn acetamide_nitrogen_is_conjugated() {
        let mol = build(
            &[Element::C, Element::C, Element::O, Element::N],
            &[
                (0, 1, BondOrder::Single),
                (1, 2, BondOrder::Double),
                (1, 3, BondOrder::Single),
            ],
        );
        assert_eq!(mol.atoms[1].hybridization, Hybridization::Sp2);
        assert_eq!(mol.atoms[2].hybridization, Hybridization::Sp2);
        assert_eq!(mol.atoms[3].hybridization, Hybridization::Sp2);
        assert_eq!(mol.atoms[0].hybridization, Hybridization::Sp3);
    }

    #[test]
    fn hydrogen_and_metal_cases() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::H).with_hydrogens(0));
        mol.atoms.push(Atom::new(Element::Fe));
        assign_hybridization(&mut mol);
        assert_eq!(mol.atoms[0].hybridization, Hybridization::S);
        assert_eq!(mol.atoms[1].hybridization, Hybridization::Unspecified);
    }

    #[test]
    fn sulfate_sulfur_is_sp3() {
        let mol = build(
            &[Element::S, Element::O, Element::O, Element::O, Element::O],
            &[
                (0, 1, BondOrder::Double),
                (0, 2, BondOrder::Double),
                (0, 3, BondOrder::Single),
                (0, 4, BondOrder::Single),
            ],
        );
        assert_eq!(mol.atoms[0].hybridization, Hybridization::Sp3);
    }
}
