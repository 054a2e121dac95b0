//! Error types for the explorer.
//!
//! Every variant renders as the single human-readable message that is
//! surfaced to the initiating action.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    MissingApiKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by a
    /// remote service or the local machine.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::MissingApiKey(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
