//! Client configuration

use clap::Args;

use crate::config::{api::ApiArgs, db::DatabaseConfig, logging::LoggingConfig};

pub mod api;
pub mod db;
pub mod logging;

pub use logging::LogFormat;

/// Bazaar client configuration, read from flags and the environment.
#[derive(Debug, Args)]
pub struct ClientConfig {
    /// Backend connection and session settings.
    #[command(flatten)]
    pub api: ApiArgs,

    /// Local preferences database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Load a `.env` file if present.
pub fn load_dotenv() {
    // Missing files are fine.
    _ = dotenvy::dotenv();
}
