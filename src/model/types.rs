use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(String);

/// Chemical elements H through Rn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn = 86,
}

/// Symbol, standard atomic weight and van der Waals radius (Å), indexed by
/// atomic number minus one.
const ELEMENT_DATA: [(&str, f64, f64); 86] = [
    ("H", 1.008, 1.20),
    ("He", 4.003, 1.40),
    ("Li", 6.941, 1.82),
    ("Be", 9.012, 1.53),
    ("B", 10.812, 1.92),
    ("C", 12.011, 1.70),
    ("N", 14.007, 1.60),
    ("O", 15.999, 1.55),
    ("F", 18.998, 1.50),
    ("Ne", 20.180, 1.54),
    ("Na", 22.990, 2.27),
    ("Mg", 24.305, 1.73),
    ("Al", 26.982, 1.84),
    ("Si", 28.086, 2.10),
    ("P", 30.974, 1.80),
    ("S", 32.067, 1.80),
    ("Cl", 35.453, 1.80),
    ("Ar", 39.948, 1.88),
    ("K", 39.098, 2.75),
    ("Ca", 40.078, 2.31),
    ("Sc", 44.956, 2.15),
    ("Ti", 47.867, 2.11),
    ("V", 50.942, 2.07),
    ("Cr", 51.996, 2.06),
    ("Mn", 54.938, 2.05),
    ("Fe", 55.845, 2.04),
    ("Co", 58.933, 2.00),
    ("Ni", 58.693, 1.63),
    ("Cu", 63.546, 1.40),
    ("Zn", 65.390, 1.39),
    ("Ga", 69.723, 1.87),
    ("Ge", 72.610, 2.11),
    ("As", 74.922, 1.85),
    ("Se", 78.960, 1.90),
    ("Br", 79.904, 1.85),
    ("Kr", 83.800, 2.02),
    ("Rb", 85.468, 3.03),
    ("Sr", 87.620, 2.49),
    ("Y", 88.906, 2.32),
    ("Zr", 91.224, 2.23),
    ("Nb", 92.906, 2.18),
    ("Mo", 95.940, 2.17),
    ("Tc", 98.000, 2.16),
    ("Ru", 101.070, 2.13),
    ("Rh", 102.906, 2.10),
    ("Pd", 106.420, 1.63),
    ("Ag", 107.868, 1.72),
    ("Cd", 112.411, 1.58),
    ("In", 114.818, 1.93),
    ("Sn", 118.710, 2.17),
    ("Sb", 121.760, 2.06),
    ("Te", 127.600, 2.06),
    ("I", 126.904, 1.98),
    ("Xe", 131.290, 2.16),
    ("Cs", 132.905, 3.43),
    ("Ba", 137.328, 2.68),
    ("La", 138.906, 2.43),
    ("Ce", 140.116, 2.42),
    ("Pr", 140.908, 2.40),
    ("Nd", 144.240, 2.39),
    ("Pm", 145.000, 2.38),
    ("Sm", 150.360, 2.36),
    ("Eu", 151.964, 2.35),
    ("Gd", 157.250, 2.34),
    ("Tb", 158.925, 2.33),
    ("Dy", 162.500, 2.31),
    ("Ho", 164.930, 2.30),
    ("Er", 167.260, 2.29),
    ("Tm", 168.934, 2.27),
    ("Yb", 173.040, 2.26),
    ("Lu", 174.967, 2.24),
    ("Hf", 178.490, 2.23),
    ("Ta", 180.948, 2.22),
    ("W", 183.840, 2.18),
    ("Re", 186.207, 2.16),
    ("Os", 190.230, 2.16),
    ("Ir", 192.217, 2.13),
    ("Pt", 195.078, 1.75),
    ("Au", 196.967, 1.66),
    ("Hg", 200.590, 1.55),
    ("Tl", 204.383, 1.96),
    ("Pb", 207.200, 2.02),
    ("Bi", 208.980, 2.07),
    ("Po", 209.000, 1.97),
    ("At", 210.000, 2.02),
    ("Rn", 222.000, 2.20),
];

impl Element {
    pub const ALL: [Element; 86] = [
        Element::H,
        Element::He,
        Element::Li,
        Element::Be,
        Element::B,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::Ne,
        Element::Na,
        Element::Mg,
        Element::Al,
        Element::Si,
        Element::P,
        Element::S,
        Element::Cl,
        Element::Ar,
        Element::K,
        Element::Ca,
        Element::Sc,
        Element::Ti,
        Element::V,
        Element::Cr,
        Element::Mn,
        Element::Fe,
        Element::Co,
        Element::Ni,
        Element::Cu,
        Element::Zn,
        Element::Ga,
        Element::Ge,
        Element::As,
        Element::Se,
        Element::Br,
        Element::Kr,
        Element::Rb,
        Element::Sr,
        Element::Y,
        Element::Zr,
        Element::Nb,
        Element::Mo,
        Element::Tc,
        Element::Ru,
        Element::Rh,
        Element::Pd,
        Element::Ag,
        Element::Cd,
        Element::In,
        Element::Sn,
        Element::Sb,
        Element::Te,
        Element::I,
        Element::Xe,
        Element::Cs,
        Element::Ba,
        Element::La,
        Element::Ce,
        Element::Pr,
        Element::Nd,
        Element::Pm,
        Element::Sm,
        Element::Eu,
        Element::Gd,
        Element::Tb,
        Element::Dy,
        Element::Ho,
        Element::Er,
        Element::Tm,
        Element::Yb,
        Element::Lu,
        Element::Hf,
        Element::Ta,
        Element::W,
        Element::Re,
        Element::Os,
        Element::Ir,
        Element::Pt,
        Element::Au,
        Element::Hg,
        Element::Tl,
        Element::Pb,
        Element::Bi,
        Element::Po,
        Element::At,
        Element::Rn,
    ];

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn from_atomic_number(z: u8) -> Option<Element> {
        Self::ALL.get(usize::from(z).checked_sub(1)?).copied()
    }

    #[inline]
    fn data(&self) -> (&'static str, f64, f64) {
        ELEMENT_DATA[usize::from(self.atomic_number()) - 1]
    }

    pub fn symbol(&self) -> &'static str {
        self.data().0
    }

    /// Standard atomic weight in g/mol.
    pub fn atomic_mass(&self) -> f64 {
        self.data().1
    }

    /// Van der Waals radius in Ångströms.
    pub fn vdw_radius(&self) -> f64 {
        self.data().2
    }

    pub fn period(&self) -> u8 {
        match self.atomic_number() {
            1..=2 => 1,
            3..=10 => 2,
            11..=18 => 3,
            19..=36 => 4,
            37..=54 => 5,
            _ => 6,
        }
    }

    /// Number of valence electrons for main-group elements and the group 11/12
    /// metals. Other transition metals and the lanthanides return `None`.
    pub fn valence_electrons(&self) -> Option<u8> {
        let z = self.atomic_number();
        match z {
            1 => Some(1),
            2 => Some(2),
            3..=10 => Some(z - 2),
            11..=18 => Some(z - 10),
            19 | 37 | 55 => Some(1),
            20 | 38 | 56 => Some(2),
            29 | 47 | 79 => Some(1),
            30 | 48 | 80 => Some(2),
            31..=36 => Some(z - 28),
            49..=54 => Some(z - 46),
            81..=86 => Some(z - 78),
            _ => None,
        }
    }

    /// Allowed valences, lowest first, for an atom of this element carrying
    /// `charge`. Charged main-group atoms take the valences of their
    /// isoelectronic neighbor (N+ behaves like C, O- like F). Elements
    /// without a valence model return an empty slice.
    pub fn allowed_valences(&self, charge: i8) -> &'static [u8] {
        let Some(ve) = self.valence_electrons() else {
            return &[];
        };
        if self.is_hydrogen() {
            return if charge == 0 { &[1] } else { &[0] };
        }
        if self.is_simple_metal() {
            return match i16::from(ve) - i16::from(charge) {
                0 => &[0],
                1 => &[1],
                2 => &[2],
                _ => &[],
            };
        }
        let effective = i16::from(ve) - i16::from(charge);
        let second_period = self.period() == 2;
        match effective {
            1 => &[1],
            2 => &[2],
            3 => &[3],
            4 => &[4],
            5 if second_period => &[3],
            5 => &[3, 5],
            6 if second_period => &[2],
            6 => &[2, 4, 6],
            7 if second_period => &[1],
            7 => &[1, 3, 5, 7],
            8 => &[0],
            _ => &[],
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }

    /// Elements whose implicit hydrogen count is derived from default valences.
    pub fn is_organic_subset(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    /// Alkali, alkaline-earth and group 11/12 metals.
    pub fn is_simple_metal(&self) -> bool {
        matches!(
            self,
            Element::Li
                | Element::Na
                | Element::K
                | Element::Rb
                | Element::Cs
                | Element::Be
                | Element::Mg
                | Element::Ca
                | Element::Sr
                | Element::Ba
                | Element::Cu
                | Element::Ag
                | Element::Au
                | Element::Zn
                | Element::Cd
                | Element::Hg
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|e| e.symbol() == s)
            .copied()
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub fn value(&self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// Integral multiplicity of a localized bond; aromatic bonds count as one.
    pub fn multiplicity(&self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }

    pub fn from_multiplicity(m: u8) -> Option<Self> {
        match m {
            1 => Some(BondOrder::Single),
            2 => Some(BondOrder::Double),
            3 => Some(BondOrder::Triple),
            _ => None,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondOrder::Single => write!(f, "Single"),
            BondOrder::Double => write!(f, "Double"),
            BondOrder::Triple => write!(f, "Triple"),
            BondOrder::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "1" => Ok(BondOrder::Single),
            "double" | "2" => Ok(BondOrder::Double),
            "triple" | "3" => Ok(BondOrder::Triple),
            "aromatic" | "ar" | "4" => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

/// Tetrahedral chirality tag relative to the atom's bond ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Chirality {
    Other,
    TetrahedralCcw,
    TetrahedralCw,
    #[default]
    Unspecified,
}

impl fmt::Display for Chirality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chirality::Other => write!(f, "Other"),
            Chirality::TetrahedralCcw => write!(f, "CCW"),
            Chirality::TetrahedralCw => write!(f, "CW"),
            Chirality::Unspecified => write!(f, "Unspecified"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hybridization {
    Other,
    S,
    Sp,
    Sp2,
    Sp3,
    Sp3d,
    Sp3d2,
    #[default]
    Unspecified,
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hybridization::Other => write!(f, "Other"),
            Hybridization::S => write!(f, "S"),
            Hybridization::Sp => write!(f, "SP"),
            Hybridization::Sp2 => write!(f, "SP2"),
            Hybridization::Sp3 => write!(f, "SP3"),
            Hybridization::Sp3d => write!(f, "SP3D"),
            Hybridization::Sp3d2 => write!(f, "SP3D2"),
            Hybridization::Unspecified => write!(f, "Unspecified"),
        }
    }
}
