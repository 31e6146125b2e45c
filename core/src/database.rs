// ABOUTME: SQLite connection pool setup and schema migrations
// ABOUTME: Opens (or creates) the database file and applies pending migrations on startup

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const IN_MEMORY: &str = ":memory:";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migrate(#[from] MigrateError),
    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Database {
    pub db_path: PathBuf,
    pub pool: SqlitePool,
}

impl Database {
    /// Connect to the database at `db_path` and run the migrations found in `migrations_path`.
    /// Passing `:memory:` as the path gives a private in-memory database, used by tests.
    pub async fn new(db_path: PathBuf, migrations_path: PathBuf) -> Result<Self, DatabaseError> {
        let pool = if db_path == Path::new(IN_MEMORY) {
            // Shared-cache memory databases only live as long as a connection does,
            // so keep it to a single long-lived connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await?
        } else {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }

            let options = SqliteConnectOptions::new()
                .filename(&db_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal);

            SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(options)
                .await?
        };

        tracing::debug!("Running migrations from {}", migrations_path.display());
        Migrator::new(migrations_path).await?.run(&pool).await?;

        Ok(Self { db_path, pool })
    }
}
