use super::error::Error;
use crate::model::molecule::Molecule;
use tracing::trace;

/// Derives implicit hydrogen counts from the default valences of the organic
/// subset. Atoms flagged `no_implicit` and elements outside the subset get
/// none.
pub fn assign_implicit_hydrogens(mol: &mut Molecule) -> Result<(), Error> {
    for idx in 0..mol.atoms.len() {
        let implicit = implicit_hydrogen_count(mol, idx)?;
        mol.atoms[idx].implicit_hydrogens = implicit;
    }
    Ok(())
}

fn implicit_hydrogen_count(mol: &Molecule, idx: usize) -> Result<u8, Error> {
    let atom = &mol.atoms[idx];
    let valences = atom.element.allowed_valences(atom.formal_charge);
    let used = mol.explicit_valence(idx) + u32::from(atom.radical_electrons);

    if !atom.element.is_organic_subset() || valences.is_empty() {
        return Ok(0);
    }

    let Some(&target) = valences.iter().find(|&&v| u32::from(v) >= used) else {
        let max = valences.last().copied().unwrap_or(0);
        return Err(Error::valence(
            idx,
            atom.symbol(),
            format!("valence {used} exceeds the maximum of {max} for charge {}", atom.formal_charge),
        ));
    };

    if atom.no_implicit {
        return Ok(0);
    }

    let count = u32::from(target) - used;
    trace!(atom = idx, symbol = atom.symbol(), count, "implicit hydrogens");
    Ok(u8::try_from(count).unwrap_or(u8::MAX))
}

/// Non-bonding electron pairs left on an atom after its bonds, hydrogens,
/// charge and radicals are accounted for.
pub fn lone_pairs(mol: &Molecule, idx: usize) -> u32 {
    let atom = &mol.atoms[idx];
    let Some(ve) = atom.element.valence_electrons() else {
        return 0;
    };
    let free = i32::from(ve)
        - i32::from(atom.formal_charge)
        - mol.total_valence(idx) as i32
        - i32::from(atom.radical_electrons);
    (free.max(0) / 2) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::molecule::Bond;
    use crate::model::types::{BondOrder, Element};

    fn chain(elements: &[Element], orders: &[BondOrder]) -> Molecule {
        let mut mol = Molecule::new();
        for &e in elements {
            mol.atoms.push(Atom::new(e));
        }
        for (i, &order) in orders.iter().enumerate() {
            mol.bonds.push(Bond::new(i, i + 1, order));
        }
        mol
    }

    #[test]
    fn ethanol_skeleton_gets_six_hydrogens() {
        let mut mol = chain(
            &[Element::C, Element::C, Element::O],
            &[BondOrder::Single, BondOrder::Single],
        );
        assign_implicit_hydrogens(&mut mol).unwrap();
        let counts: Vec<u8> = mol.atoms.iter().map(|a| a.implicit_hydrogens).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn charged_nitrogen_uses_shifted_valence() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::N).with_charge(1));
        assign_implicit_hydrogens(&mut mol).unwrap();
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
    }

    #[test]
    fn higher_valence_is_used_when_lowest_is_exceeded() {
        let mut mol = chain(
            &[Element::O, Element::S, Element::O],
            &[BondOrder::Double, BondOrder::Double],
        );
        assign_implicit_hydrogens(&mut mol).unwrap();
        assert_eq!(mol.atoms[1].implicit_hydrogens, 0);
        assert_eq!(mol.atoms[0].implicit_hydrogens, 0);
    }

    #[test]
    fn no_implicit_atoms_keep_zero() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::C).with_hydrogens(2));
        assign_implicit_hydrogens(&mut mol).unwrap();
        assert_eq!(mol.atoms[0].implicit_hydrogens, 0);
        assert_eq!(mol.atoms[0].explicit_hydrogens, 2);
    }

    #[test]
    fn pentavalent_carbon_is_rejected() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::C).with_hydrogens(5));
        let err = assign_implicit_hydrogens(&mut mol).unwrap_err();
        assert!(matches!(err, Error::Valence { atom: 0, symbol: "C", .. }));
    }

    #[test]
    fn lone_pairs_of_water_and_ammonia() {
        let mut water = Molecule::new();
        water.atoms.push(Atom::new(Element::O));
        assign_implicit_hydrogens(&mut water).unwrap();
        assert_eq!(lone_pairs(&water, 0), 2);

        let mut ammonium = Molecule::new();
        ammonium.atoms.push(Atom::new(Element::N).with_charge(1));
        assign_implicit_hydrogens(&mut ammonium).unwrap();
        assert_eq!(lone_pairs(&ammonium, 0), 0);
    }
}
