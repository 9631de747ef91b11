use crate::model::types::{BondOrder, Element};
use std::str::FromStr;

/// Resolves an element symbol written in any letter case ("CL", "cl", "Cl").
/// Deuterium and tritium labels map to hydrogen.
pub fn guess_element_symbol(token: &str) -> Option<Element> {
    let token = token.trim();
    let mut chars = token.chars();
    let first = chars.next()?;
    let symbol: String = std::iter::once(first.to_ascii_uppercase())
        .chain(chars.map(|c| c.to_ascii_lowercase()))
        .collect();
    match symbol.as_str() {
        "D" | "T" => Some(Element::H),
        s => Element::from_str(s).ok(),
    }
}

/// Bond type field of a CTfile bond line.
pub fn bond_order_from_ctfile(value: i32) -> Option<BondOrder> {
    match value {
        1 => Some(BondOrder::Single),
        2 => Some(BondOrder::Double),
        3 => Some(BondOrder::Triple),
        4 => Some(BondOrder::Aromatic),
        _ => None,
    }
}

/// Charge field of a V2000 atom line (`0` none, `1`..`7` = +3..-3, `4` is a
/// doublet radical marker and carries no charge).
pub fn charge_from_ctfile(code: i32) -> Option<i8> {
    match code {
        0 | 4 => Some(0),
        1 => Some(3),
        2 => Some(2),
        3 => Some(1),
        5 => Some(-1),
        6 => Some(-2),
        7 => Some(-3),
        _ => None,
    }
}

/// Unpaired electrons for an `M  RAD` multiplicity code.
pub fn radicals_from_ctfile(code: i32) -> Option<u8> {
    match code {
        0 => Some(0),
        1 | 3 => Some(2),
        2 => Some(1),
        _ => None,
    }
}
