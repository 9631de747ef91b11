//! Standard InChI reader.
//!
//! Reads the main layer (formula, connections, hydrogens), the charge layers
//! (`/q` and `/p`), tetrahedral stereo (`/t`, `/m`, `/s`) and relative
//! isotopic masses from `/i`. Double-bond stereo (`/b`), isotopic sublayers
//! and the fixed-H and reconnected layers are not read.
//!
//! Bond orders are not stored in InChI; see the `bonds` submodule for how
//! they are recovered.

mod bonds;
mod formula;
mod layers;

use super::{Error, Format};
use crate::chem;
use crate::model::atom::Atom;
use crate::model::molecule::{Bond, Molecule};
use crate::model::types::{BondOrder, Chirality, Element};
use layers::MobileGroup;
use std::ops::Range;
use tracing::{debug, warn};

const PREFIXES: [&str; 2] = ["InChI=1S/", "InChI=1/"];

/// A layer body and the 1-based character position where it starts.
#[derive(Debug, Clone, Copy)]
struct Layer<'a> {
    body: &'a str,
    at: usize,
}

#[derive(Debug, Default)]
struct Layers<'a> {
    connections: Option<Layer<'a>>,
    hydrogens: Option<Layer<'a>>,
    charge: Option<Layer<'a>>,
    protons: Option<Layer<'a>>,
    parities: Option<Layer<'a>>,
    inversion: Option<Layer<'a>>,
    isotopes: Option<Layer<'a>>,
}

/// Parses a standard InChI string into a sanitized [`Molecule`] with
/// hydrogens counted on their parent atoms.
///
/// # Errors
///
/// [`Error::Parse`] when the prefix is missing or a layer is malformed, with
/// the character position of the offending layer. [`Error::Chem`] when the
/// reconstructed structure fails sanitization.
pub fn parse_inchi(text: &str) -> Result<Molecule, Error> {
    let text = text.trim();
    let (prefix, body) = PREFIXES
        .into_iter()
        .find_map(|p| text.strip_prefix(p).map(|b| (p.len(), b)))
        .ok_or_else(|| Error::parse(Format::Inchi, 1, "expected an 'InChI=1S/' or 'InChI=1/' prefix"))?;

    let mut parts = body.split('/');
    let formula_layer = Layer {
        body: parts.next().unwrap_or_default(),
        at: prefix + 1,
    };
    let layers = split_layers(parts, formula_layer.at + formula_layer.body.len() + 1);

    let components = formula::parse_formula(formula_layer.body).map_err(at(formula_layer))?;
    let (mut mol, ranges) = skeleton(&components);

    if let Some(layer) = layers.connections {
        add_connections(&mut mol, &ranges, layer)?;
    }
    let mobile = match layers.hydrogens {
        Some(layer) => add_hydrogens(&mut mol, &ranges, layer)?,
        None => Vec::new(),
    };
    check_hydrogen_total(&mol, &components, &ranges);

    let mut budgets = vec![0; ranges.len()];
    if let Some(layer) = layers.charge {
        for (c, segment) in segments_for(layer, ranges.len())?.into_iter().enumerate() {
            budgets[c] = layers::parse_charge(segment).map_err(at(layer))?;
        }
    }
    if let Some(layer) = layers.protons {
        let protons = layers::parse_charge(layer.body).map_err(at(layer))?;
        apply_protons(&mut mol, &mobile, protons);
    }

    bonds::assign_bond_orders(&mut mol, &ranges, &mut budgets);

    if let Some(layer) = layers.parities {
        let inverted = match layers.inversion {
            Some(inv) => layers::parse_inversion(inv.body).map_err(at(inv))?,
            None => Vec::new(),
        };
        apply_parities(&mut mol, &ranges, layer, &inverted)?;
    }
    if let Some(layer) = layers.isotopes {
        apply_isotopes(&mut mol, &ranges, layer)?;
    }

    chem::sanitize(&mut mol)?;
    debug!(
        formula = formula_layer.body,
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        components = ranges.len(),
        "parsed InChI"
    );
    Ok(mol)
}

fn at(layer: Layer<'_>) -> impl Fn(String) -> Error {
    move |details| Error::parse(Format::Inchi, layer.at, details)
}

/// Sorts the layers after the formula by their leading letter. Everything
/// from the isotopic layer on only keeps `/i` itself, and the fixed-H (`/f`)
/// and reconnected (`/r`) layers end the main structure.
fn split_layers<'a>(parts: impl Iterator<Item = &'a str>, mut at: usize) -> Layers<'a> {
    let mut layers = Layers::default();
    let mut isotopic = false;
    for part in parts {
        let layer_at = at;
        at += part.len() + 1;
        let mut chars = part.chars();
        let Some(tag) = chars.next() else {
            continue;
        };
        let layer = Layer {
            body: chars.as_str(),
            at: layer_at,
        };
        match (tag, isotopic) {
            ('f' | 'r', _) => break,
            ('i', _) => {
                layers.isotopes = Some(layer);
                isotopic = true;
            }
            (_, true) => {}
            ('c', _) => layers.connections = Some(layer),
            ('h', _) => layers.hydrogens = Some(layer),
            ('q', _) => layers.charge = Some(layer),
            ('p', _) => layers.protons = Some(layer),
            ('t', _) => layers.parities = Some(layer),
            ('m', _) => layers.inversion = Some(layer),
            ('b' | 's', _) => {}
            (other, _) => debug!(layer = %other, "skipping unknown InChI layer"),
        }
    }
    layers
}

/// One atom per heavy element; hydrogen-only components become a single
/// hydrogen atom carrying the rest as a count.
fn skeleton(components: &[formula::Component]) -> (Molecule, Vec<Range<usize>>) {
    let mut mol = Molecule::new();
    let mut ranges = Vec::with_capacity(components.len());
    for comp in components {
        let start = mol.atom_count();
        if comp.heavy.is_empty() {
            let rest = comp.hydrogens.saturating_sub(1);
            mol.atoms
                .push(Atom::new(Element::H).with_hydrogens(u8::try_from(rest).unwrap_or(u8::MAX)));
        } else {
            mol.atoms
                .extend(comp.heavy.iter().map(|&e| Atom::new(e).with_hydrogens(0)));
        }
        ranges.push(start..mol.atom_count());
    }
    (mol, ranges)
}

fn segments_for<'a>(layer: Layer<'a>, components: usize) -> Result<Vec<&'a str>, Error> {
    let segments = layers::component_segments(layer.body).map_err(at(layer))?;
    if segments.len() > components {
        return Err(Error::parse(
            Format::Inchi,
            layer.at,
            format!("layer has {} components but the formula has {components}", segments.len()),
        ));
    }
    Ok(segments)
}

fn add_connections(mol: &mut Molecule, ranges: &[Range<usize>], layer: Layer<'_>) -> Result<(), Error> {
    for (segment, range) in segments_for(layer, ranges.len())?.into_iter().zip(ranges) {
        for (a, b) in layers::parse_connections(segment, range.len()).map_err(at(layer))? {
            mol.bonds
                .push(Bond::new(range.start + a, range.start + b, BondOrder::Single));
        }
    }
    Ok(())
}

/// Sets fixed hydrogen counts and places mobile hydrogens on the first atoms
/// of their groups. Returns the mobile groups in global atom indices.
fn add_hydrogens(
    mol: &mut Molecule,
    ranges: &[Range<usize>],
    layer: Layer<'_>,
) -> Result<Vec<MobileGroup>, Error> {
    let mut mobile = Vec::new();
    for (segment, range) in segments_for(layer, ranges.len())?.into_iter().zip(ranges) {
        // The hydrogen atom of an H2 component keeps its formula count.
        if mol.atoms[range.start].element.is_hydrogen() {
            continue;
        }
        let parsed = layers::parse_hydrogens(segment, range.len()).map_err(at(layer))?;
        for (a, count) in parsed.fixed {
            mol.atoms[range.start + a].explicit_hydrogens = count;
        }
        for mut group in parsed.mobile {
            for a in &mut group.atoms {
                *a += range.start;
            }
            for k in 0..usize::from(group.hydrogens) {
                let target = group.atoms[k % group.atoms.len()];
                mol.atoms[target].explicit_hydrogens += 1;
            }
            mobile.push(group);
        }
    }
    Ok(mobile)
}

fn check_hydrogen_total(mol: &Molecule, components: &[formula::Component], ranges: &[Range<usize>]) {
    for (c, (comp, range)) in components.iter().zip(ranges).enumerate() {
        let mut placed: u32 = mol.atoms[range.clone()]
            .iter()
            .map(|a| u32::from(a.explicit_hydrogens))
            .sum();
        if comp.heavy.is_empty() {
            placed += 1;
        }
        if placed != comp.hydrogens {
            warn!(
                component = c,
                formula = comp.hydrogens,
                placed,
                "hydrogen layer does not match the formula"
            );
        }
    }
}

/// Adds (`/p+n`) or removes (`/p-n`) protons, one charge unit each.
fn apply_protons(mol: &mut Molecule, mobile: &[MobileGroup], protons: i32) {
    let mobile_atoms: Vec<usize> = mobile.iter().flat_map(|g| g.atoms.iter().copied()).collect();
    for _ in 0..protons.unsigned_abs() {
        let site = if protons < 0 {
            deprotonation_site(mol, &mobile_atoms)
        } else {
            protonation_site(mol, &mobile_atoms)
        };
        let Some(idx) = site else {
            warn!(protons, "no site left for a proton change");
            return;
        };
        let atom = &mut mol.atoms[idx];
        if protons < 0 {
            atom.explicit_hydrogens -= 1;
            atom.formal_charge -= 1;
        } else {
            atom.explicit_hydrogens += 1;
            atom.formal_charge += 1;
        }
        debug!(atom = idx, symbol = atom.symbol(), charge = atom.formal_charge, "moved proton");
    }
}

/// Acidic hydrogens: mobile-group atoms first, then O, S, N and the
/// halogens in atom order, then any non-carbon atom.
fn deprotonation_site(mol: &Molecule, mobile_atoms: &[usize]) -> Option<usize> {
    let acidic = |i: usize| mol.atoms[i].explicit_hydrogens > 0 && mol.atoms[i].formal_charge == 0;
    const ORDER: [Element; 7] = [
        Element::O,
        Element::S,
        Element::N,
        Element::Cl,
        Element::Br,
        Element::I,
        Element::F,
    ];
    mobile_atoms
        .iter()
        .copied()
        .find(|&i| acidic(i))
        .or_else(|| {
            ORDER.into_iter().find_map(|e| {
                (0..mol.atom_count()).find(|&i| mol.atoms[i].element == e && acidic(i))
            })
        })
        .or_else(|| (0..mol.atom_count()).find(|&i| mol.atoms[i].element != Element::C && acidic(i)))
}

/// Basic sites: neutral nitrogens with room for a fourth bond, mobile-group
/// atoms first, then neutral oxygens.
fn protonation_site(mol: &Molecule, mobile_atoms: &[usize]) -> Option<usize> {
    let room = |i: usize, element: Element, limit: usize| {
        let atom = &mol.atoms[i];
        atom.element == element
            && atom.formal_charge == 0
            && mol.degree(i) + usize::from(atom.explicit_hydrogens) < limit
    };
    mobile_atoms
        .iter()
        .copied()
        .find(|&i| room(i, Element::N, 4))
        .or_else(|| (0..mol.atom_count()).find(|&i| room(i, Element::N, 4)))
        .or_else(|| (0..mol.atom_count()).find(|&i| room(i, Element::O, 3)))
}

fn apply_parities(
    mol: &mut Molecule,
    ranges: &[Range<usize>],
    layer: Layer<'_>,
    inverted: &[bool],
) -> Result<(), Error> {
    for (c, (segment, range)) in segments_for(layer, ranges.len())?
        .into_iter()
        .zip(ranges)
        .enumerate()
    {
        let invert = match inverted {
            [single] => *single,
            flags => flags.get(c).copied().unwrap_or(false),
        };
        for (a, tag) in layers::parse_parities(segment, range.len()).map_err(at(layer))? {
            mol.atoms[range.start + a].chirality = match (tag, invert) {
                (Chirality::TetrahedralCcw, true) => Chirality::TetrahedralCw,
                (Chirality::TetrahedralCw, true) => Chirality::TetrahedralCcw,
                (tag, _) => tag,
            };
        }
    }
    Ok(())
}

/// Isotopic shifts `n+d` / `n-d` relative to the rounded average mass.
/// Isotopic hydrogen items (`1D`, `2T`) are skipped.
fn apply_isotopes(mol: &mut Molecule, ranges: &[Range<usize>], layer: Layer<'_>) -> Result<(), Error> {
    for (segment, range) in segments_for(layer, ranges.len())?.into_iter().zip(ranges) {
        for item in segment.split(',').filter(|s| !s.is_empty()) {
            let Some(split) = item.find(['+', '-']) else {
                debug!(item, "skipping isotopic hydrogen item");
                continue;
            };
            let (number, shift) = item.split_at(split);
            let parse_err = || Error::parse(Format::Inchi, layer.at, format!("invalid isotope item '{item}'"));
            let number: usize = number.parse().map_err(|_| parse_err())?;
            let shift: i32 = shift.parse().map_err(|_| parse_err())?;
            if number == 0 || number > range.len() {
                return Err(Error::parse(
                    Format::Inchi,
                    layer.at,
                    format!("isotope atom {number} is outside the component"),
                ));
            }
            let atom = &mut mol.atoms[range.start + number - 1];
            let base = atom.element.atomic_mass().round() as i32;
            atom.isotope = u16::try_from(base + shift).ok();
        }
    }
    Ok(())
}
