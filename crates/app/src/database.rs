//! Local database

use sqlx::{Sqlite, SqlitePool, Transaction, query, sqlite::SqlitePoolOptions};

const CREATE_SCHEMA_SQL: &str = include_str!("sql/create_schema.sql");

/// Preferences are written rarely and by one process.
const MAX_CONNECTIONS: u32 = 1;

#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Open the `SQLite` database and make sure the schema exists.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the schema cannot be
/// created.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;

    query(CREATE_SCHEMA_SQL).execute(&pool).await?;

    Ok(pool)
}
