//! Error types for trajectory parsing and RDF estimation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse trajectory: {details} (at line {line})")]
    Parse { line: usize, details: String },

    #[error("the size of the box ({box_dim}) does not match the dimension ({dim})")]
    DimensionMismatch { box_dim: usize, dim: usize },

    #[error("RDF for dimension {0} is not implemented (only 1, 2 and 3)")]
    UnsupportedDimension(usize),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    pub fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
