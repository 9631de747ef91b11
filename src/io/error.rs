use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at {format_unit} ~{location})", format_unit = .format.location_unit())]
    Parse {
        format: Format,
        location: usize,
        details: String,
    },

    #[error("parsed structure failed sanitization: {0}")]
    Chem(#[from] crate::chem::Error),
}

impl Error {
    pub fn parse(format: Format, location: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            location,
            details: details.into(),
        }
    }
}
