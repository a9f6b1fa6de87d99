//! In-memory storage adapter

use crate::error::{Result, StoreError};
use crate::key::CompositeKey;
use crate::store::KeyValueStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Ordered in-memory store.
///
/// Keys sort segment by segment, so every descendant of a key sits directly after it in
/// the map and existence checks are a single range probe.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<CompositeKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(|_| StoreError::Poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every stored value.
    pub fn clear(&self) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .clear();
        Ok(())
    }

    fn contains_prefix(entries: &BTreeMap<CompositeKey, Value>, key: &CompositeKey) -> bool {
        entries
            .range(key.clone()..)
            .next()
            .is_some_and(|(stored, _)| key.is_prefix_of(stored))
    }
}

impl KeyValueStore for MemoryStore {
    fn exists(&self, key: &CompositeKey) -> Result<bool> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Self::contains_prefix(&entries, key))
    }

    fn put_object(&self, key: &CompositeKey, value: &Value) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.clone(), value.clone());
        Ok(())
    }

    fn get_object_with_arrays(&self, key: &CompositeKey) -> Result<Option<Value>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put_object_if_absent(
        &self,
        guard: &CompositeKey,
        key: &CompositeKey,
        value: &Value,
    ) -> Result<bool> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        // Check and insert under one write lock
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        if Self::contains_prefix(&entries, guard) {
            return Ok(false);
        }
        entries.insert(key.clone(), value.clone());
        Ok(true)
    }
}
