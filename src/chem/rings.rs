use crate::model::molecule::Molecule;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// A simple cycle, with atoms listed in path order and the bonds joining
/// consecutive atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains_atom(&self, idx: usize) -> bool {
        self.atoms.contains(&idx)
    }

    pub fn contains_bond(&self, bond: usize) -> bool {
        self.bonds.contains(&bond)
    }
}

/// Flags every bond that lies on a cycle, i.e. every bond that is not a
/// bridge of the molecular graph.
pub fn ring_bonds(mol: &Molecule) -> Vec<bool> {
    let adj = mol.adjacency();
    let n = mol.atom_count();
    let mut in_ring = vec![true; mol.bond_count()];
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut timer = 0;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;

        // (atom, bond used to reach it, next adjacency slot)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        while let Some(frame) = stack.last_mut() {
            let (u, via, slot) = *frame;
            if slot < adj[u].len() {
                frame.2 += 1;
                let (v, bond) = adj[u][slot];
                if Some(bond) == via {
                    continue;
                }
                if disc[v] == usize::MAX {
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    stack.push((v, Some(bond), 0));
                } else {
                    low[u] = low[u].min(disc[v]);
                }
            } else {
                stack.pop();
                if let (Some(bond), Some(&(parent, _, _))) = (via, stack.last()) {
                    low[parent] = low[parent].min(low[u]);
                    if low[u] > disc[parent] {
                        in_ring[bond] = false;
                    }
                }
            }
        }
    }
    in_ring
}

/// Marks `in_ring` on every atom that has at least one ring bond.
pub fn assign_ring_membership(mol: &mut Molecule, ring_bonds: &[bool]) {
    for atom in &mut mol.atoms {
        atom.in_ring = false;
    }
    for (bi, &cyclic) in ring_bonds.iter().enumerate() {
        if cyclic {
            let (b, e) = (mol.bonds[bi].begin, mol.bonds[bi].end);
            mol.atoms[b].in_ring = true;
            mol.atoms[e].in_ring = true;
        }
    }
}

/// The smallest ring through each ring bond, deduplicated and sorted by
/// size and then by atom indices.
///
/// For fused and bridged systems this yields a set of small rings covering
/// every ring bond; it is not guaranteed to be a minimal cycle basis.
pub fn smallest_rings(mol: &Molecule, ring_bonds: &[bool]) -> Vec<Ring> {
    let adj = mol.adjacency();
    let mut seen: HashSet<BTreeSet<usize>> = HashSet::new();
    let mut rings = Vec::new();

    for (bi, &cyclic) in ring_bonds.iter().enumerate() {
        if !cyclic {
            continue;
        }
        let (start, goal) = (mol.bonds[bi].begin, mol.bonds[bi].end);
        let Some(mut ring) = shortest_cycle(&adj, ring_bonds, bi, start, goal) else {
            continue;
        };
        let key: BTreeSet<usize> = ring.atoms.iter().copied().collect();
        if seen.insert(key) {
            ring.bonds.push(bi);
            rings.push(ring);
        }
    }

    rings.sort_by(|a, b| {
        let mut ka = a.atoms.clone();
        let mut kb = b.atoms.clone();
        ka.sort_unstable();
        kb.sort_unstable();
        a.len().cmp(&b.len()).then(ka.cmp(&kb))
    });
    rings
}

/// Breadth-first search from `start` to `goal` over ring bonds, never using
/// the `excluded` bond. Returns the path as a ring missing its closing bond.
fn shortest_cycle(
    adj: &[Vec<(usize, usize)>],
    ring_bonds: &[bool],
    excluded: usize,
    start: usize,
    goal: usize,
) -> Option<Ring> {
    let mut prev: Vec<Option<(usize, usize)>> = vec![None; adj.len()];
    let mut visited = vec![false; adj.len()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(u) = queue.pop_front() {
        if u == goal {
            break;
        }
        for &(v, bond) in &adj[u] {
            if bond == excluded || !ring_bonds[bond] || visited[v] {
                continue;
            }
            visited[v] = true;
            prev[v] = Some((u, bond));
            queue.push_back(v);
        }
    }

    if !visited[goal] {
        return None;
    }

    let mut atoms = vec![goal];
    let mut bonds = Vec::new();
    let mut cur = goal;
    while let Some((p, bond)) = prev[cur] {
        atoms.push(p);
        bonds.push(bond);
        cur = p;
    }
    atoms.reverse();
    bonds.reverse();
    Some(Ring { atoms, bonds })
}
