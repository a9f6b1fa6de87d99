//! Cache-first retrieval of FHIR search results

use crate::error::FetchThroughError;
use relay_cache::{KeyValueStore, QueryCache};
use relay_rest::ResourceFetcher;
use serde_json::Value;

/// Where a search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Remote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub document: Value,
    pub source: Source,
}

/// Composes a remote fetcher with a by-query cache.
///
/// The two halves know nothing of each other; this type is the caller that asks the
/// cache first, fetches on a miss and stores the result for next time.
pub struct FetchThrough<F, S> {
    fetcher: F,
    cache: QueryCache<S>,
}

impl<F, S> FetchThrough<F, S>
where
    F: ResourceFetcher,
    S: KeyValueStore,
{
    pub fn new(fetcher: F, cache: QueryCache<S>) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &QueryCache<S> {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Search results for `query`, from cache when present.
    ///
    /// Only successful results are cached, including empty bundles.
    pub async fn search(
        &self,
        resource_type: &str,
        query: &str,
        token: &str,
    ) -> Result<Fetched, FetchThroughError> {
        if self.cache.exists(resource_type, query)? {
            if let Some(document) = self.cache.get(resource_type, query)? {
                tracing::info!(resource_type, query, "Serving search from cache");
                return Ok(Fetched {
                    document,
                    source: Source::Cache,
                });
            }
            // Another writer claimed the key but has not stored data yet
            tracing::debug!(resource_type, query, "Cache entry incomplete, fetching");
        }

        let document = self
            .fetcher
            .get_resources(resource_type, query, token)
            .await?;
        self.cache.set(resource_type, query, &document)?;

        Ok(Fetched {
            document,
            source: Source::Remote,
        })
    }

    /// Single-resource read. Not cached.
    pub async fn read(&self, reference: &str, token: &str) -> Result<Value, FetchThroughError> {
        Ok(self.fetcher.get_resource(reference, token).await?)
    }
}
