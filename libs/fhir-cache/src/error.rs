//! Error types for relay-cache

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage adapter errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid composite key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("No cache directory available (pass an explicit root)")]
    NoCacheDir,
}
