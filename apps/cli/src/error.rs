//! Error types for the relay CLI

use relay_cache::StoreError;
use relay_rest::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure of a fetch-through call: either the remote read or the cache store.
#[derive(Error, Debug)]
pub enum FetchThroughError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cache error: {0}")]
    Store(#[from] StoreError),
}
