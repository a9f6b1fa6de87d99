//! Filesystem storage adapter
//!
//! Each key segment becomes one directory level below the root. Segments are
//! percent-encoded so that separators, `.`/`..` and empty segments map to safe, distinct
//! directory names. Segments that would encode to more than [`MAX_SEGMENT_LEN`] bytes
//! are replaced by `%h` plus the SHA-256 of the raw segment, which keeps directory names
//! under the usual 255-byte `NAME_MAX`. The value stored at a key lives in a `%value.json`
//! file inside the key's directory; `%v` and `%h` never appear in a percent-encoded
//! segment, so neither the file nor hashed names can collide with a plain child key.

use crate::error::{Result, StoreError};
use crate::key::CompositeKey;
use crate::store::KeyValueStore;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const VALUE_FILE: &str = "%value.json";
const HASHED_PREFIX: &str = "%h";
/// Longest encoded segment stored verbatim as a directory name.
pub const MAX_SEGMENT_LEN: usize = 200;
const DEFAULT_DIR_NAME: &str = "fhir-relay";

/// Directory-tree store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    /// Create a store at `root`, or at `<platform cache dir>/fhir-relay` when `None`.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => dirs::cache_dir()
                .ok_or(StoreError::NoCacheDir)?
                .join(DEFAULT_DIR_NAME),
        };
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_dir(&self, key: &CompositeKey) -> PathBuf {
        key.segments()
            .iter()
            .fold(self.root.clone(), |path, segment| {
                path.join(encode_segment(segment))
            })
    }

    /// Write `bytes` as the value file of `dir` through a uniquely named temp file.
    fn write_value(&self, dir: &Path, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(dir.join(VALUE_FILE)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Percent-encode one key segment into a directory name.
pub(crate) fn encode_segment(segment: &str) -> String {
    if segment.is_empty() {
        return "%".to_string();
    }
    let encoded = urlencoding::encode(segment);
    if encoded.len() > MAX_SEGMENT_LEN {
        let digest = Sha256::digest(segment.as_bytes());
        return format!("{}{:x}", HASHED_PREFIX, digest);
    }
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{}", rest),
        None => encoded.into_owned(),
    }
}

impl KeyValueStore for FileSystemStore {
    fn exists(&self, key: &CompositeKey) -> Result<bool> {
        Ok(self.key_dir(key).is_dir())
    }

    fn put_object(&self, key: &CompositeKey, value: &Value) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        let dir = self.key_dir(key);
        tracing::trace!(key = %key, path = %dir.display(), "Writing cache value");
        self.write_value(&dir, &serde_json::to_vec(value)?)
    }

    fn get_object_with_arrays(&self, key: &CompositeKey) -> Result<Option<Value>> {
        let path = self.key_dir(key).join(VALUE_FILE);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
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
        if guard.is_empty() || !guard.is_prefix_of(key) {
            return Err(StoreError::InvalidKey(format!(
                "{} is not an ancestor of {}",
                guard, key
            )));
        }

        let bytes = serde_json::to_vec(value)?;
        let guard_dir = self.key_dir(guard);
        if let Some(parent) = guard_dir.parent() {
            fs::create_dir_all(parent)?;
        }

        // Exclusive creation of the guard directory decides the winner
        match fs::create_dir(&guard_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        // Release the guard so a later set can retry
        if let Err(e) = self.write_value(&self.key_dir(key), &bytes) {
            if let Err(cleanup) = fs::remove_dir_all(&guard_dir) {
                tracing::warn!(
                    path = %guard_dir.display(),
                    error = %cleanup,
                    "Failed to remove guard after write error"
                );
            }
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("Immunization"), "Immunization");
        assert_eq!(encode_segment("identifier=test"), "identifier%3Dtest");
        assert_eq!(encode_segment("a/b"), "a%2Fb");
        assert_eq!(encode_segment(""), "%");
        assert_eq!(encode_segment("."), "%2E");
        assert_eq!(encode_segment(".."), "%2E.");
        assert_eq!(encode_segment("%value.json"), "%25value.json");
    }

    #[test]
    fn test_long_segment_is_hashed() {
        let query = (0..20)
            .map(|n| format!("identifier=urn:oid:1.2.840.113619.{}", n))
            .collect::<Vec<_>>()
            .join("&");
        let encoded = encode_segment(&query);

        assert!(encoded.starts_with(HASHED_PREFIX));
        assert_eq!(encoded.len(), HASHED_PREFIX.len() + 64);
        assert_eq!(encoded, encode_segment(&query));
        assert_ne!(encoded, encode_segment(&format!("{}&x=1", query)));

        let short = "a".repeat(MAX_SEGMENT_LEN);
        assert_eq!(encode_segment(&short), short);
    }

    #[test]
    fn test_long_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap();
        let query = "identifier=".to_string() + &"urn:oid:1.2.3|".repeat(40);
        let guard = CompositeKey::new(["Fhir", "Immunization", "by_query", query.as_str()]);
        let data = guard.child("data");

        assert!(store.put_object_if_absent(&guard, &data, &json!({"entry": []})).unwrap());

        assert!(store.exists(&guard).unwrap());
        assert_eq!(
            store.get_object_with_arrays(&data).unwrap(),
            Some(json!({"entry": []}))
        );
    }

    #[test]
    fn test_failed_write_releases_guard() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap();
        let guard = CompositeKey::new(["Fhir", "Immunization", "by_query", "identifier=test"]);
        // Deep enough below the guard to exceed PATH_MAX
        let segment = "d".repeat(MAX_SEGMENT_LEN);
        let data = (0..30).fold(guard.clone(), |key, _| key.child(segment.as_str()));

        assert!(store.put_object_if_absent(&guard, &data, &json!(1)).is_err());

        assert!(!store.exists(&guard).unwrap());
        assert!(store
            .put_object_if_absent(&guard, &guard.child("data"), &json!(2))
            .unwrap());
    }

    #[test]
    fn test_concurrent_put_object_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(
            FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap(),
        );
        let key = CompositeKey::new(["Fhir", "Patient", "shared"]);

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = std::sync::Arc::clone(&store);
                let key = key.clone();
                std::thread::spawn(move || store.put_object(&key, &json!({"writer": n})))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let stored = store.get_object_with_arrays(&key).unwrap().unwrap();
        assert!(stored["writer"].as_u64().unwrap() < 8);
    }

    #[test]
    fn test_round_trip_nested_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap();
        let key = CompositeKey::new(["Fhir", "Patient", "by_query", "name=a/b", "data"]);
        let value = json!({"entry": [{"resource": {"resourceType": "Patient", "name": [{"given": ["A", "B"]}]}}]});

        store.put_object(&key, &value).unwrap();

        assert_eq!(store.get_object_with_arrays(&key).unwrap(), Some(value));
        assert!(store
            .exists(&CompositeKey::new(["Fhir", "Patient", "by_query", "name=a/b"]))
            .unwrap());
        assert!(!store
            .exists(&CompositeKey::new(["Fhir", "Patient", "by_query", "name=a"]))
            .unwrap());
    }

    #[test]
    fn test_dot_segments_stay_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        let store = FileSystemStore::new(Some(root.clone())).unwrap();
        let key = CompositeKey::new(["..", "..", "escape"]);

        store.put_object(&key, &json!(true)).unwrap();

        assert!(store.key_dir(&key).starts_with(&root));
        assert!(!dir.path().join("escape").exists());
        assert_eq!(store.get_object_with_arrays(&key).unwrap(), Some(json!(true)));
    }

    #[test]
    fn test_put_if_absent_first_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap();
        let guard = CompositeKey::new(["Fhir", "Observation", "by_query", ""]);
        let data = guard.child("data");

        assert!(store.put_object_if_absent(&guard, &data, &json!({"n": 1})).unwrap());
        assert!(!store.put_object_if_absent(&guard, &data, &json!({"n": 2})).unwrap());
        assert_eq!(
            store.get_object_with_arrays(&data).unwrap(),
            Some(json!({"n": 1}))
        );
    }

    #[test]
    fn test_put_if_absent_rejects_unrelated_guard() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap();
        let result = store.put_object_if_absent(
            &CompositeKey::new(["a"]),
            &CompositeKey::new(["b", "data"]),
            &json!(1),
        );
        assert!(matches!(result, Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_missing_value_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemStore::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(
            store
                .get_object_with_arrays(&CompositeKey::new(["nothing", "here"]))
                .unwrap(),
            None
        );
    }
}
