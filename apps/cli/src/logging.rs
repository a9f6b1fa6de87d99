//! Logging initialization for the relay CLI
//!
//! Logs go to stderr so stdout carries only the JSON documents the CLI prints.
//! `RUST_LOG` overrides the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry().with(build_env_filter(config));

    if config.json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)))
}

/// Our crates at `level`, HTTP plumbing at warn.
fn default_directives(level: &str) -> String {
    format!(
        "fhir_relay={level},relay_cli={level},relay_cache={level},relay_rest={level},reqwest=warn,hyper=warn,hyper_util=warn"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let directives = default_directives("debug");
        assert!(directives.contains("relay_cache=debug"));
        assert!(directives.contains("relay_rest=debug"));
        assert!(directives.contains("reqwest=warn"));
        // Must parse as a filter
        EnvFilter::try_new(&directives).unwrap();
    }
}
