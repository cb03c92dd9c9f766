//! Database Config

use clap::Args;

/// Local database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `SQLite` connection string for locally stored preferences
    #[arg(
        long,
        env = "BAZAAR_DATABASE_URL",
        default_value = "sqlite://bazaar.db?mode=rwc"
    )]
    pub database_url: String,
}
