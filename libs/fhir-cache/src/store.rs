//! Storage adapter interface

use crate::error::Result;
use crate::key::CompositeKey;
use serde_json::Value;
use std::sync::Arc;

/// Hierarchical key-value storage the cache is layered on.
///
/// A key exists when a value is stored at it or at any key below it. Reads must return
/// documents with their nested arrays and objects intact.
pub trait KeyValueStore: Send + Sync {
    fn exists(&self, key: &CompositeKey) -> Result<bool>;

    fn put_object(&self, key: &CompositeKey, value: &Value) -> Result<()>;

    fn get_object_with_arrays(&self, key: &CompositeKey) -> Result<Option<Value>>;

    /// Writes `value` at `key` unless `guard` already exists. Returns whether it wrote.
    ///
    /// The default is a plain check followed by a write; adapters that can make the pair
    /// atomic should override it.
    fn put_object_if_absent(
        &self,
        guard: &CompositeKey,
        key: &CompositeKey,
        value: &Value,
    ) -> Result<bool> {
        if self.exists(guard)? {
            return Ok(false);
        }
        self.put_object(key, value)?;
        Ok(true)
    }
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn exists(&self, key: &CompositeKey) -> Result<bool> {
        (**self).exists(key)
    }

    fn put_object(&self, key: &CompositeKey, value: &Value) -> Result<()> {
        (**self).put_object(key, value)
    }

    fn get_object_with_arrays(&self, key: &CompositeKey) -> Result<Option<Value>> {
        (**self).get_object_with_arrays(key)
    }

    fn put_object_if_absent(
        &self,
        guard: &CompositeKey,
        key: &CompositeKey,
        value: &Value,
    ) -> Result<bool> {
        (**self).put_object_if_absent(guard, key, value)
    }
}
