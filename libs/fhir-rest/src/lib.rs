//! FHIR REST Resource Service
//!
//! Async, bearer-authenticated reads against a FHIR REST API. Responses are normalized
//! into either a JSON document or a [`FetchError`] carrying `message` and `code`; the
//! underlying HTTP error never reaches the caller.
//!
//! # Examples
//!
//! ```rust,no_run
//! use relay_rest::{bundle, HostConfig, ResourceRestService, SearchQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ResourceRestService::new(HostConfig::new("https://fhir.example.org/r4"))?;
//!
//! let immunization = service
//!     .get_resource("Immunization/48f8c9e3-7bae-4418-b896-2423957f3c33", "token")
//!     .await?;
//!
//! let query = SearchQuery::new().param("identifier", "test").to_string();
//! let results = service.get_resources("Immunization", &query, "token").await?;
//! if bundle::is_empty(&results) {
//!     println!("no matches");
//! }
//! # Ok(())
//! # }
//! ```
//!
pub mod bundle;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod query;
pub mod service;

pub use config::{HostConfig, HostConfigSource};
pub use error::{Error, FetchError, Result, FALLBACK_CODE};
pub use fetcher::ResourceFetcher;
pub use query::SearchQuery;
pub use service::ResourceRestService;
