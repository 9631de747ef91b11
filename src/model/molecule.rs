use super::atom::Atom;
use super::types::BondOrder;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    /// Creates a bond with the lower atom index stored as `begin`.
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        if idx1 <= idx2 {
            Self {
                begin: idx1,
                end: idx2,
                order,
            }
        } else {
            Self {
                begin: idx2,
                end: idx1,
                order,
            }
        }
    }

    #[inline]
    pub fn contains(&self, idx: usize) -> bool {
        self.begin == idx || self.end == idx
    }

    /// The atom on the other side of this bond, if `idx` is one of its ends.
    #[inline]
    pub fn other(&self, idx: usize) -> Option<usize> {
        if self.begin == idx {
            Some(self.end)
        } else if self.end == idx {
            Some(self.begin)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.element.is_hydrogen()).count()
    }

    /// Per-atom `(neighbor, bond index)` lists, in bond order.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adj = vec![Vec::new(); self.atoms.len()];
        for (bi, bond) in self.bonds.iter().enumerate() {
            if bond.begin < adj.len() && bond.end < adj.len() {
                adj[bond.begin].push((bond.end, bi));
                adj[bond.end].push((bond.begin, bi));
            }
        }
        adj
    }

    pub fn neighbors(&self, idx: usize) -> Vec<usize> {
        self.bonds.iter().filter_map(|b| b.other(idx)).collect()
    }

    /// Number of bonded graph neighbors.
    pub fn degree(&self, idx: usize) -> usize {
        self.bonds.iter().filter(|b| b.contains(idx)).count()
    }

    pub fn find_bond(&self, i: usize, j: usize) -> Option<usize> {
        let key = (i.min(j), i.max(j));
        self.bonds.iter().position(|b| (b.begin, b.end) == key)
    }

    /// Hydrogen atoms bonded to `idx` as graph neighbors.
    pub fn hydrogen_neighbors(&self, idx: usize) -> usize {
        self.bonds
            .iter()
            .filter_map(|b| b.other(idx))
            .filter(|&n| self.atoms[n].element.is_hydrogen())
            .count()
    }

    /// All hydrogens on an atom: counted ones plus explicit hydrogen atoms.
    pub fn total_hydrogens(&self, idx: usize) -> usize {
        usize::from(self.atoms[idx].attached_hydrogens()) + self.hydrogen_neighbors(idx)
    }

    /// Sum of bond orders plus explicitly counted hydrogens, aromatic bonds
    /// contributing 1.5 and the total rounded half up.
    ///
    /// An aromatic atom whose total (this sum plus implicit hydrogens)
    /// overshoots its lowest allowed valence is pulled down to the largest
    /// allowed valence not above that total, so that pyrrole-type nitrogens
    /// keep a total valence of 3.
    pub fn explicit_valence(&self, idx: usize) -> u32 {
        let atom = &self.atoms[idx];
        let mut accum: f64 = self
            .bonds
            .iter()
            .filter(|b| b.contains(idx))
            .map(|b| b.order.value())
            .sum();
        accum += f64::from(atom.explicit_hydrogens);

        let valences = atom.element.allowed_valences(atom.formal_charge);
        if atom.is_aromatic {
            let implicit = f64::from(atom.implicit_hydrogens);
            let total = accum + implicit;
            if let Some(&lowest) = valences.first() {
                if total > f64::from(lowest) {
                    let capped = valences
                        .iter()
                        .map(|&v| f64::from(v))
                        .filter(|&v| v <= total)
                        .fold(f64::from(lowest), f64::max);
                    accum = (capped - implicit).max(0.0);
                }
            }
        }
        (accum + 0.5).floor() as u32
    }

    #[inline]
    pub fn implicit_valence(&self, idx: usize) -> u32 {
        u32::from(self.atoms[idx].implicit_hydrogens)
    }

    #[inline]
    pub fn total_valence(&self, idx: usize) -> u32 {
        self.explicit_valence(idx) + self.implicit_valence(idx)
    }

    /// Net formal charge of the molecule.
    pub fn formal_charge(&self) -> i32 {
        self.atoms.iter().map(|a| i32::from(a.formal_charge)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    fn make_water() -> Molecule {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::O));
        mol.atoms.push(Atom::new(Element::H));
        mol.atoms.push(Atom::new(Element::H));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Single));
        mol.bonds.push(Bond::new(2, 0, BondOrder::Single));
        mol
    }

    #[test]
    fn bond_new_orders_indices() {
        let bond = Bond::new(5, 2, BondOrder::Double);
        assert_eq!(bond.begin, 2);
        assert_eq!(bond.end, 5);
        assert_eq!(bond.other(2), Some(5));
        assert_eq!(bond.other(3), None);
    }

    #[test]
    fn counts_and_degree() {
        let water = make_water();
        assert_eq!(water.atom_count(), 3);
        assert_eq!(water.bond_count(), 2);
        assert_eq!(water.heavy_atom_count(), 1);
        assert_eq!(water.degree(0), 2);
        assert_eq!(water.degree(1), 1);
        assert_eq!(water.neighbors(0), vec![1, 2]);
    }

    #[test]
    fn valence_counts_hydrogen_atoms_and_counts() {
        let mut water = make_water();
        assert_eq!(water.explicit_valence(0), 2);
        assert_eq!(water.total_hydrogens(0), 2);

        water.atoms[0].explicit_hydrogens = 1;
        assert_eq!(water.explicit_valence(0), 3);
        assert_eq!(water.total_hydrogens(0), 3);
    }

    #[test]
    fn aromatic_bonds_round_to_integer_valence() {
        let mut mol = Molecule::new();
        for _ in 0..3 {
            mol.atoms.push(Atom::new(Element::C));
        }
        mol.bonds.push(Bond::new(0, 1, BondOrder::Aromatic));
        mol.bonds.push(Bond::new(1, 2, BondOrder::Aromatic));
        assert_eq!(mol.explicit_valence(1), 3);
        assert_eq!(mol.find_bond(2, 1), Some(1));
        assert_eq!(mol.find_bond(0, 2), None);
    }

    #[test]
    fn aromatic_overshoot_is_clamped() {
        let mut mol = Molecule::new();
        mol.atoms.push(Atom::new(Element::N).with_hydrogens(1));
        mol.atoms.push(Atom::new(Element::C));
        mol.atoms.push(Atom::new(Element::C));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Aromatic));
        mol.bonds.push(Bond::new(0, 2, BondOrder::Aromatic));
        assert_eq!(mol.explicit_valence(0), 4);

        mol.atoms[0].is_aromatic = true;
        assert_eq!(mol.explicit_valence(0), 3);
    }

    #[test]
    fn adjacency_lists_neighbor_and_bond() {
        let water = make_water();
        let adj = water.adjacency();
        assert_eq!(adj[0], vec![(1, 0), (2, 1)]);
        assert_eq!(adj[2], vec![(0, 1)]);
    }
}
