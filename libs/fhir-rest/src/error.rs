//! Error types for relay-rest

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code used when neither the remote nor the transport reports one.
pub const FALLBACK_CODE: u16 = 500;

/// Result type alias for construction
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a [`crate::ResourceRestService`]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid host URL '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Normalized failure of a remote read.
///
/// Serializes to `{"message": ..., "code": ...}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct FetchError {
    pub message: String,
    pub code: u16,
}

impl FetchError {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Error with the generic fallback code.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, FALLBACK_CODE)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let code = err
            .status()
            .map(|status| status.as_u16())
            .unwrap_or(FALLBACK_CODE);
        Self::new(err.to_string(), code)
    }
}
