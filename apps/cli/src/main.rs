//! fhir-relay - cache-first FHIR reads from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use relay_cli::{context, logging, AppConfig, FetchThroughError, Source};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fhir-relay", version, about = "Cache-first FHIR reads")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token for the FHIR API
    #[arg(long, global = true, env = "FHIR_RELAY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read one resource by reference, e.g. Immunization/123
    Read { reference: String },

    /// Search a resource type, serving repeated queries from the cache
    Search {
        resource_type: String,
        #[arg(default_value = "")]
        query: String,
    },

    /// Inspect the query cache without contacting the server
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Print whether a query result is cached
    Exists {
        resource_type: String,
        #[arg(default_value = "")]
        query: String,
    },

    /// Print the cached result of a query
    Show {
        resource_type: String,
        #[arg(default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env may supply the token as well as config overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Command::Read { reference } => {
            let token = require_token(cli.token.as_deref())?;
            let relay = context::build_relay(&config)?;
            match relay.read(&reference, token).await {
                Ok(document) => print_json(&document),
                Err(err) => report(err),
            }
        }
        Command::Search {
            resource_type,
            query,
        } => {
            let token = require_token(cli.token.as_deref())?;
            let relay = context::build_relay(&config)?;
            match relay.search(&resource_type, &query, token).await {
                Ok(fetched) => {
                    tracing::info!(
                        cached = fetched.source == Source::Cache,
                        resource_type,
                        query,
                        "Search complete"
                    );
                    print_json(&fetched.document)
                }
                Err(err) => report(err),
            }
        }
        Command::Cache { action } => {
            let cache = context::open_cache(&config.cache).context("Failed to open query cache")?;
            match action {
                CacheCommand::Exists {
                    resource_type,
                    query,
                } => {
                    println!("{}", cache.exists(&resource_type, &query)?);
                    Ok(ExitCode::SUCCESS)
                }
                CacheCommand::Show {
                    resource_type,
                    query,
                } => match cache.get(&resource_type, &query)? {
                    Some(document) => print_json(&document),
                    None => {
                        eprintln!("Not cached: {} {}", resource_type, query);
                        Ok(ExitCode::from(2))
                    }
                },
            }
        }
    }
}

fn require_token(token: Option<&str>) -> anyhow::Result<&str> {
    token.context("Missing bearer token (pass --token or set FHIR_RELAY_TOKEN)")
}

fn print_json(document: &Value) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(ExitCode::SUCCESS)
}

/// Remote failures print as `{"message", "code"}` on stderr; cache failures abort.
fn report(err: FetchThroughError) -> anyhow::Result<ExitCode> {
    match err {
        FetchThroughError::Fetch(fetch) => {
            eprintln!("{}", serde_json::to_string(&fetch)?);
            Ok(ExitCode::FAILURE)
        }
        other => Err(other.into()),
    }
}
