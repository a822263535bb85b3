//! Common error types for Sphinx components.

use thiserror::Error;

/// Common errors across Sphinx components
#[derive(Debug, Error)]
pub enum SphinxError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template registration or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// Final-stage token could not be parsed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl SphinxError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Template(_) => 500,
            Self::InvalidToken(_) => 400,
        }
    }
}
