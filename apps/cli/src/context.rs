//! Wiring of configuration into cache and REST service instances

use crate::config::{AppConfig, CacheBackend, CacheConfig};
use crate::fetch_through::FetchThrough;
use anyhow::Context;
use relay_cache::{FileSystemStore, KeyValueStore, MemoryStore, QueryCache, StoreError};
use relay_rest::ResourceRestService;
use std::sync::Arc;

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Fetch-through over the configured backend.
pub type Relay = FetchThrough<ResourceRestService, SharedStore>;

pub fn open_store(config: &CacheConfig) -> Result<SharedStore, StoreError> {
    let store: SharedStore = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
        CacheBackend::Filesystem => Arc::new(FileSystemStore::new(config.directory.clone())?),
    };
    tracing::debug!(backend = ?config.backend, "Opened cache store");
    Ok(store)
}

pub fn open_cache(config: &CacheConfig) -> Result<QueryCache<SharedStore>, StoreError> {
    Ok(QueryCache::with_namespace(
        open_store(config)?,
        config.namespace.clone(),
    ))
}

pub fn build_relay(config: &AppConfig) -> anyhow::Result<Relay> {
    let service =
        ResourceRestService::create(config).context("Failed to create FHIR REST service")?;
    let cache = open_cache(&config.cache).context("Failed to open query cache")?;
    Ok(FetchThrough::new(service, cache))
}
