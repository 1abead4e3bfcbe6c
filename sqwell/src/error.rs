//! Error types for the square-well Monte Carlo engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    ConfigFormat(#[from] serde_yml::Error),

    #[error("particle count mismatch: {what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        found: usize,
        expected: usize,
    },
}

impl Error {
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
