pub mod config;
pub mod context;
pub mod error;
pub mod fetch_through;
pub mod logging;

pub use config::AppConfig;
pub use error::{ConfigError, FetchThroughError};
pub use fetch_through::{FetchThrough, Fetched, Source};
