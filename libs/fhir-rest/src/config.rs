//! Host configuration for the REST service

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_timeout_seconds() -> u64 {
    30
}

/// Where the FHIR API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Scheme, authority and optional base path, e.g. `https://10.153.7.80:444/FHIRService`.
    pub host: String,

    /// Extra path prefix appended to `host` before every request path.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl HostConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// `host` joined with `path`, without a trailing slash.
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        match self
            .path
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
        {
            Some(path) => format!("{}/{}", host, path),
            None => host.to_string(),
        }
    }

    /// Check that `host` is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidHost {
            host: self.host.clone(),
            reason,
        };

        let url = reqwest::Url::parse(&self.host).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }
}

/// Anything that can hand out the API host configuration, typically the
/// application's execution context.
pub trait HostConfigSource {
    fn host_config(&self) -> &HostConfig;
}

impl HostConfigSource for HostConfig {
    fn host_config(&self) -> &HostConfig {
        self
    }
}
