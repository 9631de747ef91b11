use super::types::{Chirality, Element, Hybridization};

/// A single atom together with the chemistry perceived for it.
///
/// The hydrogen bookkeeping follows the usual toolkit convention:
/// `explicit_hydrogens` are hydrogens stated by the input (for example the
/// InChI `/h` layer) that are not graph atoms, while `implicit_hydrogens`
/// are derived from default valences unless `no_implicit` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub formal_charge: i8,
    pub chirality: Chirality,
    pub explicit_hydrogens: u8,
    pub implicit_hydrogens: u8,
    pub no_implicit: bool,
    pub radical_electrons: u8,
    pub isotope: Option<u16>,
    pub hybridization: Hybridization,
    pub is_aromatic: bool,
    pub in_ring: bool,
    /// Gasteiger partial charge, present once charges have been assigned.
    pub partial_charge: Option<f64>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            chirality: Chirality::Unspecified,
            explicit_hydrogens: 0,
            implicit_hydrogens: 0,
            no_implicit: false,
            radical_electrons: 0,
            isotope: None,
            hybridization: Hybridization::Unspecified,
            is_aromatic: false,
            in_ring: false,
            partial_charge: None,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }

    /// Sets a fixed hydrogen count and disables implicit hydrogen perception.
    pub fn with_hydrogens(mut self, count: u8) -> Self {
        self.explicit_hydrogens = count;
        self.no_implicit = true;
        self
    }

    #[inline]
    pub fn symbol(&self) -> &'static str {
        self.element.symbol()
    }

    /// Hydrogens carried as counts (explicit plus implicit).
    #[inline]
    pub fn attached_hydrogens(&self) -> u8 {
        self.explicit_hydrogens + self.implicit_hydrogens
    }
}
