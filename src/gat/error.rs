use thiserror::Error;

/// Errors raised while building, running or (de)serializing a model.
#[derive(Debug, Error)]
pub enum Error {
    /// The model configuration is inconsistent.
    #[error("invalid model configuration: {0}")]
    Config(String),

    /// An input or parameter has the wrong size for the layer consuming it.
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// What was being checked, for example "node features".
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("failed to (de)serialize model parameters: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to parse model configuration: {0}")]
    TomlConfig(#[from] toml::de::Error),
}

impl Error {
    pub fn dimension(context: &'static str, expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            found,
        }
    }
}
