use super::super::error::Error;
use crate::model::types::{Element, Hybridization};
use serde::Deserialize;
use std::sync::OnceLock;

const DEFAULT_PARAMS_TOML: &str = include_str!("../../../resources/gasteiger.params.toml");

static DEFAULT_PARAMS: OnceLock<GasteigerParams> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct GasteigerParams {
    #[serde(default)]
    pub hydrogen: HydrogenParams,
    #[serde(default)]
    pub atoms: Vec<ElectronegativityParams>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HydrogenParams {
    /// Replaces `a + b + c` as the normalizing term for hydrogen.
    #[serde(default = "default_hydrogen_ionization")]
    pub ionization: f64,
}

fn default_hydrogen_ionization() -> f64 {
    20.02
}

impl Default for HydrogenParams {
    fn default() -> Self {
        Self {
            ionization: default_hydrogen_ionization(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElectronegativityParams {
    pub element: Element,
    #[serde(default)]
    pub hybridization: Option<Hybridization>,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ElectronegativityParams {
    /// Orbital electronegativity at charge `q`.
    #[inline]
    pub fn chi(&self, q: f64) -> f64 {
        self.a + q * (self.b + self.c * q)
    }

    /// Electronegativity of the cation, `chi(+1)`.
    #[inline]
    pub fn ionization(&self) -> f64 {
        self.a + self.b + self.c
    }
}

impl GasteigerParams {
    /// Finds parameters for an element in a given state: the exact
    /// hybridization first, then a state-independent entry, then any entry
    /// for the element.
    pub fn lookup(
        &self,
        element: Element,
        hybridization: Hybridization,
    ) -> Option<&ElectronegativityParams> {
        let same_element = || self.atoms.iter().filter(move |p| p.element == element);
        same_element()
            .find(|p| p.hybridization == Some(hybridization))
            .or_else(|| same_element().find(|p| p.hybridization.is_none()))
            .or_else(|| same_element().next())
    }
}

pub fn load_parameters(custom_toml: Option<&str>) -> Result<GasteigerParams, Error> {
    match custom_toml {
        Some(toml) => {
            let params: GasteigerParams = toml::from_str(toml)?;
            Ok(params)
        }
        None => Ok(get_default_parameters().clone()),
    }
}

pub fn get_default_parameters() -> &'static GasteigerParams {
    DEFAULT_PARAMS.get_or_init(|| {
        toml::from_str(DEFAULT_PARAMS_TOML)
            .expect("Failed to parse embedded Gasteiger parameters. This is a library bug.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn embedded_table_parses() {
        let params = get_default_parameters();
        assert_relative_eq!(params.hydrogen.ionization, 20.02);
        assert!(params.atoms.len() >= 18);
    }

    #[test]
    fn lookup_prefers_exact_state() {
        let params = get_default_parameters();
        let c2 = params.lookup(Element::C, Hybridization::Sp2).unwrap();
        assert_relative_eq!(c2.a, 8.79);
        let c3 = params.lookup(Element::C, Hybridization::Sp3).unwrap();
        assert_relative_eq!(c3.a, 7.98);
    }

    #[test]
    fn lookup_falls_back_to_generic_then_any() {
        let params = get_default_parameters();
        let cl = params.lookup(Element::Cl, Hybridization::Sp3).unwrap();
        assert_relative_eq!(cl.a, 11.00);
        let o = params.lookup(Element::O, Hybridization::Sp).unwrap();
        assert_eq!(o.element, Element::O);
        assert!(params.lookup(Element::Fe, Hybridization::Unspecified).is_none());
    }

    #[test]
    fn custom_table_replaces_defaults() {
        let toml = r#"
            [[atoms]]
            element = "C"
            a = 1.0
            b = 2.0
            c = 3.0
        "#;
        let params = load_parameters(Some(toml)).unwrap();
        assert_relative_eq!(params.hydrogen.ionization, 20.02);
        let c = params.lookup(Element::C, Hybridization::Sp).unwrap();
        assert_relative_eq!(c.ionization(), 6.0);
        assert_relative_eq!(c.chi(1.0), 6.0);
    }

    #[test]
    fn malformed_table_is_an_error() {
        let err = load_parameters(Some("atoms = 3")).unwrap_err();
        assert!(matches!(err, Error::ParameterParse(_)));
    }
}
