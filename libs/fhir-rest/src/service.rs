//! Authenticated reads against a FHIR REST API

use crate::config::{HostConfig, HostConfigSource};
use crate::error::{FetchError, Result, FALLBACK_CODE};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;

const FHIR_JSON: &str = "application/fhir+json";

/// Client for single-resource reads and searches.
///
/// Every call returns either the parsed JSON document or a [`FetchError`]. Successful
/// responses without a body are not failures: a read yields `{}` and a search yields
/// `{"entry": []}`.
#[derive(Debug, Clone)]
pub struct ResourceRestService {
    client: Client,
    host_config: HostConfig,
    base_url: String,
}

impl ResourceRestService {
    /// Create a service with its own HTTP client.
    pub fn new(host_config: HostConfig) -> Result<Self> {
        host_config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(host_config.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, host_config))
    }

    /// Create a service that shares an existing HTTP client.
    pub fn with_client(client: Client, host_config: HostConfig) -> Self {
        let base_url = host_config.base_url();
        Self {
            client,
            host_config,
            base_url,
        }
    }

    /// Create a service from whatever execution context carries the host configuration.
    pub fn create<C>(ctx: &C) -> Result<Self>
    where
        C: HostConfigSource + ?Sized,
    {
        Self::new(ctx.host_config().clone())
    }

    pub fn host_config(&self) -> &HostConfig {
        &self.host_config
    }

    /// `<base>/<reference>`
    pub fn resource_url(&self, reference: &str) -> String {
        format!("{}/{}", self.base_url, reference.trim_start_matches('/'))
    }

    /// `<base>/<resource_type>?<query>`, or `<base>/<resource_type>` for an empty query.
    pub fn search_url(&self, resource_type: &str, query: &str) -> String {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            format!("{}/{}", self.base_url, resource_type)
        } else {
            format!("{}/{}?{}", self.base_url, resource_type, query)
        }
    }

    /// Read one resource by reference, e.g. `Immunization/48f8c9e3`.
    pub async fn get_resource(
        &self,
        reference: &str,
        token: &str,
    ) -> std::result::Result<Value, FetchError> {
        tracing::info!(reference, "Fetching FHIR resource");
        let url = self.resource_url(reference);
        self.fetch(&url, token, Value::Object(Map::new())).await
    }

    /// Search `resource_type` with a serialized query string, e.g. `identifier=test`.
    pub async fn get_resources(
        &self,
        resource_type: &str,
        query: &str,
        token: &str,
    ) -> std::result::Result<Value, FetchError> {
        tracing::info!(resource_type, query, "Searching FHIR resources");
        let url = self.search_url(resource_type, query);
        self.fetch(&url, token, json!({ "entry": [] })).await
    }

    async fn fetch(
        &self,
        url: &str,
        token: &str,
        empty: Value,
    ) -> std::result::Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| {
                let err = FetchError::from(e);
                tracing::warn!(url, code = err.code, error = %err.message, "FHIR request failed");
                err
            })?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::from)?;

        let result = normalize_response(status, &body, empty);
        match &result {
            Ok(_) => tracing::debug!(url, status = status.as_u16(), "FHIR request succeeded"),
            Err(err) => {
                tracing::warn!(url, code = err.code, error = %err.message, "FHIR request failed")
            }
        }
        result
    }
}

/// Turn a status and raw body into a document or a normalized error.
pub(crate) fn normalize_response(
    status: StatusCode,
    body: &str,
    empty: Value,
) -> std::result::Result<Value, FetchError> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }

    if body.trim().is_empty() {
        return Ok(empty);
    }

    serde_json::from_str(body)
        .map_err(|e| FetchError::new(format!("Invalid JSON response: {}", e), FALLBACK_CODE))
}

/// Extract the remote-reported message and code from an error response.
///
/// Message: top-level `message`, then the first OperationOutcome issue's `diagnostics`
/// or `details.text`, then the status reason. Code: numeric top-level `code`, then the
/// HTTP status.
fn error_from_body(status: StatusCode, body: &str) -> FetchError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let parsed = parsed.as_ref();

    let message = parsed
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .or_else(|| {
            let issue = parsed?.get("issue")?.get(0)?;
            issue
                .get("diagnostics")
                .and_then(Value::as_str)
                .or_else(|| issue.get("details")?.get("text")?.as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });

    let code = parsed
        .and_then(|v| v.get("code"))
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
        .unwrap_or_else(|| status.as_u16());

    FetchError::new(message, code)
}
