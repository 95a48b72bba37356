// src/error.rs

//! Error types for the reconciliation engine

use thiserror::Error;

/// Errors raised by tapdrift operations
///
/// Per-entry failures during a bulk comparison (`TransportError`,
/// `MalformedResponse`) are recorded in the report instead of being
/// propagated. Everything else is fatal to the operation that raised it.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing credentials, tap URL, git binary, or an invalid config file
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Neither branch could be cloned or pulled, even after recovery
    #[error("Mirror unavailable: {0}")]
    MirrorUnavailable(String),

    /// A single git command failed
    #[error("Git error: {0}")]
    GitError(String),

    /// Network failure or timeout
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Unexpected status code or undecodable response body
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error belongs to a single upstream lookup rather than the whole run
    pub fn is_per_entry(&self) -> bool {
        matches!(
            self,
            Error::TransportError(_) | Error::MalformedResponse(_) | Error::NotFoundError(_)
        )
    }
}
