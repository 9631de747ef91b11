use super::activation::Activation;
use super::error::Error;
use crate::featurize::ATOM_FEATURE_DIM;
use serde::{Deserialize, Serialize};

/// How node embeddings are reduced to one row per graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pooling {
    #[default]
    Sum,
    Mean,
}

/// Hyperparameters of a [`Gat`](super::Gat).
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes:
///
/// ```
/// use chem_gat::gat::GatConfig;
///
/// let config = GatConfig::from_toml_str("num_classes = 3\nheads = [4, 4, 2]").unwrap();
/// assert_eq!(config.num_classes, 3);
/// assert_eq!(config.num_layers, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatConfig {
    /// Number of hidden attention layers. One more output layer follows.
    pub num_layers: usize,
    /// Width of the node feature rows.
    pub in_dim: usize,
    /// Per-head width of every hidden layer.
    pub num_hidden: usize,
    pub num_classes: usize,
    /// Attention heads per layer, `num_layers + 1` entries.
    pub heads: Vec<usize>,
    /// Applied after every hidden layer.
    pub activation: Activation,
    /// Residual connections on hidden layers after the first.
    pub residual: bool,
    /// Slope of the LeakyReLU applied to attention logits.
    pub negative_slope: f32,
    pub pooling: Pooling,
    /// Seed for parameter initialization; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GatConfig {
    fn default() -> Self {
        Self {
            num_layers: 2,
            in_dim: ATOM_FEATURE_DIM,
            num_hidden: 8,
            num_classes: 1,
            heads: vec![8, 8, 1],
            activation: Activation::Elu,
            residual: false,
            negative_slope: 0.2,
            pooling: Pooling::Sum,
            seed: None,
        }
    }
}

impl GatConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`Error::TomlConfig`] for malformed TOML, [`Error::Config`] if the
    /// values are inconsistent.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.num_layers == 0 {
            return Err(Error::Config("num_layers must be at least 1".into()));
        }
        if self.heads.len() != self.num_layers + 1 {
            return Err(Error::Config(format!(
                "heads has {} entries, expected num_layers + 1 = {}",
                self.heads.len(),
                self.num_layers + 1
            )));
        }
        if let Some(pos) = self.heads.iter().position(|&h| h == 0) {
            return Err(Error::Config(format!("heads[{pos}] must be positive")));
        }
        for (name, value) in [
            ("in_dim", self.in_dim),
            ("num_hidden", self.num_hidden),
            ("num_classes", self.num_classes),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be positive")));
            }
        }
        if !self.negative_slope.is_finite() {
            return Err(Error::Config("negative_slope must be finite".into()));
        }
        Ok(())
    }

    /// Heads of the output attention layer.
    pub fn output_heads(&self) -> usize {
        self.heads.last().copied().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GatConfig::default();
        config.validate().unwrap();
        assert_eq!(config.in_dim, 46);
        assert_eq!(config.output_heads(), 1);
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let config = GatConfig::from_toml_str(
            r#"
            num_layers = 1
            heads = [2, 3]
            activation = "relu"
            pooling = "mean"
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.heads, vec![2, 3]);
        assert_eq!(config.activation, Activation::Relu);
        assert_eq!(config.pooling, Pooling::Mean);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.num_hidden, 8);
    }

    #[test]
    fn head_count_must_follow_layers() {
        let err = GatConfig::from_toml_str("num_layers = 3").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("heads")));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        for config in [
            GatConfig { num_layers: 0, heads: vec![1], ..Default::default() },
            GatConfig { heads: vec![8, 0, 1], ..Default::default() },
            GatConfig { num_hidden: 0, ..Default::default() },
            GatConfig { num_classes: 0, ..Default::default() },
        ] {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            GatConfig::from_toml_str("num_layers = \"two\""),
            Err(Error::TomlConfig(_))
        ));
    }
}
