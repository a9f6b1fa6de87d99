//! Cache of resources and bundles keyed by resource type and query string

use crate::error::Result;
use crate::key::KeySpace;
use crate::store::KeyValueStore;
use serde_json::Value;

/// By-query cache over a [`KeyValueStore`].
///
/// Entries are write-once: the first `set` for a `(resource_type, query)` pair stores its
/// document and every later `set` for the same pair is ignored. Nothing here expires or
/// removes entries.
#[derive(Debug, Clone)]
pub struct QueryCache<S> {
    store: S,
    keys: KeySpace,
}

impl<S: KeyValueStore> QueryCache<S> {
    /// Create a cache using the default `Fhir` namespace.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, KeySpace::default())
    }

    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Self {
        Self::with_keys(store, KeySpace::new(namespace))
    }

    pub fn with_keys(store: S, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn namespace(&self) -> &str {
        self.keys.namespace()
    }

    /// Whether a result for this query has been cached.
    pub fn exists(&self, resource_type: &str, query: &str) -> Result<bool> {
        tracing::debug!(resource_type, query, "query cache exists");
        let key = self.keys.by_query(resource_type, query);
        self.store.exists(&key)
    }

    /// Cache `resource` for this query unless an entry is already present.
    ///
    /// Returns `true` when this call stored the document.
    pub fn set(&self, resource_type: &str, query: &str, resource: &Value) -> Result<bool> {
        tracing::debug!(resource_type, query, "query cache set");
        let key = self.keys.by_query(resource_type, query);
        let data_key = self.keys.by_query_data(resource_type, query);

        let written = self.store.put_object_if_absent(&key, &data_key, resource)?;
        if !written {
            tracing::debug!(resource_type, query, "query already cached, keeping first result");
        }
        Ok(written)
    }

    /// The cached document for this query, if any.
    pub fn get(&self, resource_type: &str, query: &str) -> Result<Option<Value>> {
        tracing::debug!(resource_type, query, "query cache get");
        let data_key = self.keys.by_query_data(resource_type, query);
        self.store.get_object_with_arrays(&data_key)
    }
}
