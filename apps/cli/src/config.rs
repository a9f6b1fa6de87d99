//! Layered configuration for the relay CLI
//!
//! Sources, lowest to highest priority:
//! 1. Embedded defaults
//! 2. `<config dir>/fhir-relay/config.toml`
//! 3. `fhir-relay.toml` in the working directory
//! 4. The file passed with `--config`
//! 5. `FHIR_RELAY__<SECTION>__<KEY>` environment variables

use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use relay_cache::DEFAULT_NAMESPACE;
use relay_rest::{HostConfig, HostConfigSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_TOML: &str = r#"
[api]
timeout_seconds = 30

[cache]
backend = "filesystem"
namespace = "Fhir"

[logging]
level = "info"
json = false
"#;

const ENV_PREFIX: &str = "FHIR_RELAY";
const LOCAL_CONFIG_FILE: &str = "fhir-relay.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: HostConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    #[default]
    Filesystem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// Root of the filesystem store; the platform cache dir when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            directory: None,
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load from all sources; `path` must exist when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = defaults();

        if let Some(dir) = dirs::config_dir() {
            let user_config = dir.join("fhir-relay").join("config.toml");
            builder = builder.add_source(File::from(user_config).required(false));
        }
        builder =
            builder.add_source(File::from(Path::new(LOCAL_CONFIG_FILE)).required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    /// Load from embedded defaults overlaid with a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::finish(defaults().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.host.trim().is_empty() {
            return Err(ConfigError::Invalid("api.host must not be empty".to_string()));
        }
        self.api
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.cache.namespace.is_empty() {
            return Err(ConfigError::Invalid(
                "cache.namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl HostConfigSource for AppConfig {
    fn host_config(&self) -> &HostConfig {
        &self.api
    }
}

fn defaults() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml))
}
