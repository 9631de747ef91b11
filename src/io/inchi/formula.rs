use crate::model::types::Element;
use std::str::FromStr;

/// One disconnected component of the formula layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Non-hydrogen atoms in InChI numbering order.
    pub heavy: Vec<Element>,
    /// Hydrogens listed in the formula.
    pub hydrogens: u32,
}

/// Parses the formula layer into components, expanding leading multipliers
/// such as the `2` of `2H2O`.
pub fn parse_formula(text: &str) -> Result<Vec<Component>, String> {
    if text.is_empty() {
        return Err("formula layer is empty".to_string());
    }
    let mut components = Vec::new();
    for part in text.split('.') {
        let digits = part.chars().take_while(|c| c.is_ascii_digit()).count();
        let copies = if digits == 0 {
            1
        } else {
            part[..digits]
                .parse::<usize>()
                .map_err(|_| format!("invalid component multiplier in '{part}'"))?
        };
        let component = parse_component(&part[digits..])?;
        components.extend(std::iter::repeat_n(component, copies));
    }
    Ok(components)
}

fn parse_component(text: &str) -> Result<Component, String> {
    if text.is_empty() {
        return Err("empty formula component".to_string());
    }
    let bytes = text.as_bytes();
    let mut heavy = Vec::new();
    let mut hydrogens = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_uppercase() {
            return Err(format!(
                "unexpected character '{}' in formula '{text}'",
                bytes[i] as char
            ));
        }
        let start = i;
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_lowercase() {
            i += 1;
        }
        let symbol = &text[start..i];
        let count_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let count = if count_start == i {
            1
        } else {
            text[count_start..i]
                .parse::<u32>()
                .map_err(|_| format!("invalid atom count after '{symbol}'"))?
        };

        let element = Element::from_str(symbol).map_err(|e| e.to_string())?;
        if element.is_hydrogen() {
            hydrogens += count;
        } else {
            heavy.extend(std::iter::repeat_n(element, count as usize));
        }
    }

    Ok(Component { heavy, hydrogens })
}
