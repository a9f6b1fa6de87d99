//! FHIR By-Query Cache
//!
//! Answers "have I already fetched this query?" for FHIR searches and stores the first
//! result fetched for each `(resource type, query string)` pair.
//!
//! The cache sits on a [`KeyValueStore`] that resolves composite keys such as
//! `["Fhir", "Immunization", "by_query", "identifier=test", "data"]`. Two stores ship
//! with the crate: [`MemoryStore`] and [`FileSystemStore`].
//!
//! # Examples
//!
//! ```rust
//! use relay_cache::{MemoryStore, QueryCache};
//! use serde_json::json;
//!
//! # fn example() -> relay_cache::Result<()> {
//! let cache = QueryCache::new(MemoryStore::new());
//! let bundle = json!({"entry": []});
//!
//! if !cache.exists("Immunization", "identifier=test")? {
//!     cache.set("Immunization", "identifier=test", &bundle)?;
//! }
//! assert_eq!(cache.get("Immunization", "identifier=test")?, Some(bundle));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod query_cache;
pub mod store;

pub use error::{Result, StoreError};
pub use fs::FileSystemStore;
pub use key::{CompositeKey, KeySpace, DEFAULT_NAMESPACE};
pub use memory::MemoryStore;
pub use query_cache::QueryCache;
pub use store::KeyValueStore;
