//! Bond order reconstruction.
//!
//! InChI stores connectivity and hydrogen counts but no bond orders. Each
//! atom's deficit (its target valence minus single bonds and hydrogens) has
//! to be paid by raising bond orders between atoms that both have a
//! deficit, which is an exact degree-constrained matching solved here by
//! backtracking. Charges from the `/q` layer are placed where they make the
//! valence model consistent.

use crate::model::molecule::Molecule;
use crate::model::types::{BondOrder, Element};
use std::ops::Range;
use tracing::{debug, warn};

/// Search steps allowed before falling back to a greedy partial assignment.
const STEP_LIMIT: usize = 200_000;

/// Reconstructs bond orders in place. `budgets` holds the unplaced net
/// charge of each component and is consumed as charges are assigned.
pub fn assign_bond_orders(mol: &mut Molecule, components: &[Range<usize>], budgets: &mut [i32]) {
    let component_of = component_lookup(mol.atom_count(), components);
    place_required_charges(mol, components, budgets);

    let adj = mol.adjacency();
    let mut targets: Vec<Option<u8>> = (0..mol.atom_count())
        .map(|i| lowest_target(mol, i, mol.atoms[i].formal_charge))
        .collect();
    raise_starved_neighbors(mol, &adj, &mut targets);

    let mut extra = match saturate(&adj, &deficits(mol, &targets)) {
        Ok(extra) => Some(extra),
        Err(_) => None,
    };

    // Spend the remaining charge budget where it makes the system solvable.
    while extra.is_none() {
        let Some((atom, delta)) = best_charge_change(mol, &adj, &targets, &component_of, budgets)
        else {
            break;
        };
        apply_charge(mol, &mut targets, atom, delta);
        budgets[component_of[atom]] -= i32::from(delta);
        extra = saturate(&adj, &deficits(mol, &targets)).ok();
    }

    let extra = match extra {
        Some(extra) => extra,
        None => {
            let (partial, leftover) = greedy(&adj, &deficits(mol, &targets));
            absorb_leftover(mol, &mut targets, &component_of, budgets, &leftover);
            partial
        }
    };

    for (bond, &inc) in mol.bonds.iter_mut().zip(&extra) {
        if let Some(order) = BondOrder::from_multiplicity(1 + inc) {
            bond.order = order;
        }
    }
    separate_pentavalent_nitrogen(mol, &targets);

    for (c, &budget) in budgets.iter().enumerate() {
        if budget != 0 {
            warn!(component = c, charge = budget, "could not place component charge");
        }
    }
}

fn component_lookup(n: usize, components: &[Range<usize>]) -> Vec<usize> {
    let mut lookup = vec![0; n];
    for (c, range) in components.iter().enumerate() {
        for slot in &mut lookup[range.clone()] {
            *slot = c;
        }
    }
    lookup
}

/// Single bonds plus hydrogens plus unpaired electrons.
fn used_valence(mol: &Molecule, idx: usize) -> u32 {
    let atom = &mol.atoms[idx];
    mol.degree(idx) as u32 + u32::from(atom.explicit_hydrogens) + u32::from(atom.radical_electrons)
}

/// Valences an atom may take while orders are reconstructed. Neutral
/// nitrogen may go pentavalent; such atoms are charge-separated afterwards.
fn candidate_valences(element: Element, charge: i8) -> Vec<u8> {
    let mut valences = element.allowed_valences(charge).to_vec();
    if element == Element::N && charge == 0 {
        valences.push(5);
    }
    valences
}

fn lowest_target(mol: &Molecule, idx: usize, charge: i8) -> Option<u8> {
    let used = used_valence(mol, idx);
    candidate_valences(mol.atoms[idx].element, charge)
        .into_iter()
        .find(|&v| u32::from(v) >= used)
}

/// Whether the single-bond skeleton already fits a regular valence.
fn fits_allowed(mol: &Molecule, idx: usize, charge: i8) -> bool {
    let used = used_valence(mol, idx);
    mol.atoms[idx]
        .element
        .allowed_valences(charge)
        .iter()
        .any(|&v| u32::from(v) >= used)
}

fn deficits(mol: &Molecule, targets: &[Option<u8>]) -> Vec<u8> {
    targets
        .iter()
        .enumerate()
        .map(|(i, t)| match t {
            Some(t) => (u32::from(*t).saturating_sub(used_valence(mol, i))) as u8,
            None => 0,
        })
        .collect()
}

/// Over-valent atoms take the sign of their component charge (quaternary
/// N+, BF4-); remaining positive charge goes to isolated simple metals.
fn place_required_charges(mol: &mut Molecule, components: &[Range<usize>], budgets: &mut [i32]) {
    for (c, range) in components.iter().enumerate() {
        for idx in range.clone() {
            if budgets[c] == 0 {
                break;
            }
            let charge = mol.atoms[idx].formal_charge;
            if fits_allowed(mol, idx, charge) || mol.atoms[idx].element.valence_electrons().is_none() {
                continue;
            }
            let step: i8 = if budgets[c] > 0 { 1 } else { -1 };
            if fits_allowed(mol, idx, charge + step) {
                mol.atoms[idx].formal_charge += step;
                budgets[c] -= i32::from(step);
            }
        }

        // A bare single-atom ion carries the whole component charge.
        if range.len() == 1 && budgets[c] != 0 {
            let atom = &mut mol.atoms[range.start];
            if atom.explicit_hydrogens == 0 {
                let q = budgets[c].clamp(i32::from(i8::MIN), i32::from(i8::MAX));
                atom.formal_charge = atom.formal_charge.saturating_add(q as i8);
                budgets[c] -= q;
                continue;
            }
        }

        for idx in range.clone() {
            if budgets[c] <= 0 {
                break;
            }
            let atom = &mol.atoms[idx];
            if atom.element.is_simple_metal() && atom.formal_charge == 0 && mol.degree(idx) == 0 {
                let ve = i32::from(atom.element.valence_electrons().unwrap_or(1));
                let q = budgets[c].min(ve);
                mol.atoms[idx].formal_charge = q as i8;
                budgets[c] -= q;
            }
        }
    }
}

/// Raises the valence of a neighbor when an atom's deficit cannot be paid by
/// its neighbors at their current targets (nitro N, sulfonyl S, phosphate P).
fn raise_starved_neighbors(mol: &Molecule, adj: &[Vec<(usize, usize)>], targets: &mut [Option<u8>]) {
    loop {
        let def = deficits(mol, targets);
        let mut changed = false;
        for x in 0..def.len() {
            if def[x] == 0 {
                continue;
            }
            let capacity: u32 = adj[x].iter().map(|&(y, _)| u32::from(def[y].min(2))).sum();
            if capacity >= u32::from(def[x]) {
                continue;
            }
            let raised = adj[x].iter().find_map(|&(y, _)| {
                let current = targets[y]?;
                let next = candidate_valences(mol.atoms[y].element, mol.atoms[y].formal_charge)
                    .into_iter()
                    .find(|&v| v > current)?;
                Some((y, next))
            });
            if let Some((y, next)) = raised {
                debug!(atom = y, valence = next, "raised valence to saturate neighbor");
                targets[y] = Some(next);
                changed = true;
                break;
            }
        }
        if !changed {
            return;
        }
    }
}

/// Picks the charge change, within the component budgets, that lets the
/// system saturate; failing that, the one leaving the smallest leftover.
fn best_charge_change(
    mol: &Molecule,
    adj: &[Vec<(usize, usize)>],
    targets: &[Option<u8>],
    component_of: &[usize],
    budgets: &[i32],
) -> Option<(usize, i8)> {
    let def = deficits(mol, targets);
    let mut best: Option<(usize, i8, u32)> = None;

    for pass in 0..2 {
        for idx in 0..mol.atom_count() {
            let budget = budgets[component_of[idx]];
            if budget == 0 {
                continue;
            }
            let delta: i8 = if budget > 0 { 1 } else { -1 };
            let atom = &mol.atoms[idx];
            if atom.formal_charge != 0 {
                continue;
            }
            // Heteroatoms are tried first for anions, carbon first for cations.
            let preferred = match delta {
                -1 => !matches!(atom.element, Element::C),
                _ => matches!(atom.element, Element::C | Element::N),
            };
            if preferred != (pass == 0) {
                continue;
            }
            if delta < 0 && def[idx] == 0 {
                continue;
            }
            let Some(new_target) = lowest_target(mol, idx, atom.formal_charge + delta) else {
                continue;
            };
            let mut trial = targets.to_vec();
            trial[idx] = Some(new_target);
            let trial_def = deficits(mol, &trial);

            if saturate(adj, &trial_def).is_ok() {
                return Some((idx, delta));
            }
            let (_, leftover) = greedy(adj, &trial_def);
            let remaining: u32 = leftover.iter().map(|&d| u32::from(d)).sum();
            if best.is_none_or(|(_, _, r)| remaining < r) {
                best = Some((idx, delta, remaining));
            }
        }
    }

    let (_, leftover) = greedy(adj, &def);
    let current: u32 = leftover.iter().map(|&d| u32::from(d)).sum();
    best.filter(|&(_, _, r)| r < current).map(|(i, d, _)| (i, d))
}

fn apply_charge(mol: &mut Molecule, targets: &mut [Option<u8>], idx: usize, delta: i8) {
    mol.atoms[idx].formal_charge += delta;
    targets[idx] = lowest_target(mol, idx, mol.atoms[idx].formal_charge);
}

/// Leftover deficits take any remaining component charge, then become
/// unpaired electrons.
fn absorb_leftover(
    mol: &mut Molecule,
    targets: &mut [Option<u8>],
    component_of: &[usize],
    budgets: &mut [i32],
    leftover: &[u8],
) {
    for (idx, &left) in leftover.iter().enumerate() {
        let mut left = u32::from(left);
        let c = component_of[idx];
        let used = used_valence(mol, idx);
        while left > 0 && budgets[c] != 0 {
            let Some(current) = targets[idx] else {
                break;
            };
            let delta: i8 = if budgets[c] > 0 { 1 } else { -1 };
            let consumed = u32::from(current) - used - left;
            let Some(lower) = lowest_target(mol, idx, mol.atoms[idx].formal_charge + delta) else {
                break;
            };
            if lower >= current || u32::from(lower) < used + consumed {
                break;
            }
            apply_charge(mol, targets, idx, delta);
            budgets[c] -= i32::from(delta);
            left = u32::from(lower) - used - consumed;
        }
        if left > 0 {
            warn!(
                atom = idx,
                symbol = mol.atoms[idx].symbol(),
                electrons = left,
                "unsaturated atom left as radical"
            );
            mol.atoms[idx].radical_electrons += left as u8;
        }
    }
}

/// Rewrites pentavalent neutral nitrogen with a multiple bond to a terminal
/// heteroatom into the charge-separated form (nitro, N-oxide, azide).
fn separate_pentavalent_nitrogen(mol: &mut Molecule, targets: &[Option<u8>]) {
    for idx in 0..mol.atom_count() {
        if mol.atoms[idx].element != Element::N
            || mol.atoms[idx].formal_charge != 0
            || targets[idx] != Some(5)
        {
            continue;
        }
        let candidate = mol.bonds.iter().position(|b| {
            b.contains(idx)
                && b.order.multiplicity() > 1
                && b.other(idx).is_some_and(|o| {
                    matches!(mol.atoms[o].element, Element::O | Element::N | Element::S)
                        && mol.degree(o) == 1
                        && mol.atoms[o].formal_charge == 0
                })
        });
        if let Some(bi) = candidate {
            let Some(partner) = mol.bonds[bi].other(idx) else {
                continue;
            };
            let lowered = mol.bonds[bi].order.multiplicity() - 1;
            if let Some(order) = BondOrder::from_multiplicity(lowered) {
                mol.bonds[bi].order = order;
            }
            mol.atoms[idx].formal_charge = 1;
            mol.atoms[partner].formal_charge = -1;
        }
    }
}

/// Options for atom `x`: neighbors with deficit left through bonds that can
/// still be raised.
fn options(adj: &[Vec<(usize, usize)>], def: &[u8], extra: &[u8], x: usize) -> Vec<(usize, usize)> {
    adj[x]
        .iter()
        .copied()
        .filter(|&(y, b)| def[y] > 0 && extra[b] < 2)
        .collect()
}

/// The unsatisfied atom with the fewest options, and those options.
fn most_constrained(
    adj: &[Vec<(usize, usize)>],
    def: &[u8],
    extra: &[u8],
    skip: &[bool],
) -> Option<(usize, Vec<(usize, usize)>)> {
    let mut best: Option<(usize, Vec<(usize, usize)>)> = None;
    for x in 0..def.len() {
        if def[x] == 0 || skip[x] {
            continue;
        }
        let opts = options(adj, def, extra, x);
        let room: u32 = opts
            .iter()
            .map(|&(y, b)| u32::from(def[y].min(2 - extra[b])))
            .sum();
        if room < u32::from(def[x]) {
            return Some((x, Vec::new()));
        }
        if best.as_ref().is_none_or(|(_, o)| opts.len() < o.len()) {
            best = Some((x, opts));
        }
    }
    best
}

struct Search<'a> {
    adj: &'a [Vec<(usize, usize)>],
    def: Vec<u8>,
    extra: Vec<u8>,
    steps: usize,
}

impl Search<'_> {
    fn solve(&mut self) -> bool {
        self.steps += 1;
        if self.steps > STEP_LIMIT {
            return false;
        }
        let skip = vec![false; self.def.len()];
        let Some((x, opts)) = most_constrained(self.adj, &self.def, &self.extra, &skip) else {
            return true;
        };
        for (y, b) in opts {
            self.def[x] -= 1;
            self.def[y] -= 1;
            self.extra[b] += 1;
            if self.solve() {
                return true;
            }
            self.def[x] += 1;
            self.def[y] += 1;
            self.extra[b] -= 1;
        }
        false
    }
}

/// Exact saturation: the extra multiplicity of each bond, or the search
/// step count on failure.
fn saturate(adj: &[Vec<(usize, usize)>], def: &[u8]) -> Result<Vec<u8>, usize> {
    let n_bonds = adj
        .iter()
        .flat_map(|v| v.iter().map(|&(_, b)| b + 1))
        .max()
        .unwrap_or(0);
    let mut search = Search {
        adj,
        def: def.to_vec(),
        extra: vec![0; n_bonds],
        steps: 0,
    };
    if search.solve() {
        Ok(search.extra)
    } else {
        Err(search.steps)
    }
}

/// Greedy saturation without backtracking. Returns the bond increments and
/// the deficit left on each atom.
fn greedy(adj: &[Vec<(usize, usize)>], def: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let n_bonds = adj
        .iter()
        .flat_map(|v| v.iter().map(|&(_, b)| b + 1))
        .max()
        .unwrap_or(0);
    let mut def = def.to_vec();
    let mut extra = vec![0; n_bonds];
    let mut skip = vec![false; def.len()];

    while let Some((x, opts)) = most_constrained(adj, &def, &extra, &skip) {
        match opts.first() {
            Some(&(y, b)) => {
                def[x] -= 1;
                def[y] -= 1;
                extra[b] += 1;
            }
            None => {
                let any = options(adj, &def, &extra, x).first().copied();
                match any {
                    Some((y, b)) => {
                        def[x] -= 1;
                        def[y] -= 1;
                        extra[b] += 1;
                    }
                    None => skip[x] = true,
                }
            }
        }
    }
    (extra, def)
}
