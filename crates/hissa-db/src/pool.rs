//! # Database Handle
//!
//! Opens the SQLite file that backs the session store.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new(path)            file path, pool size, migrate flag      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await    mkdir parent, open pool, migrate        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SessionStore::open(&db, rate)  load, apply, unlock writes              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Files use WAL with `synchronous = NORMAL`. A crash can drop the most
//! recent save but leaves the file readable.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::records::RecordRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the session database lives and how to connect to it.
///
/// ```rust,ignore
/// let config = DbConfig::new(dirs.data_dir().join("hissa.db"));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:` for a private in-memory database.
    pub database_path: PathBuf,

    /// Pool ceiling. A single `hissa` run needs at most two.
    pub max_connections: u32,

    pub min_connections: u32,

    /// How long to wait for a free connection.
    pub connect_timeout: Duration,

    /// Apply embedded migrations after connecting.
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed configuration. The file is created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 2,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A throwaway database that disappears with its connection.
    ///
    /// Every SQLite connection to `:memory:` sees its own database, so the
    /// pool is pinned to exactly one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }

    /// Connection options for this configuration.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        if let Some(dir) = self
            .database_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
        {
            std::fs::create_dir_all(dir).map_err(|e| {
                DbError::ConnectionFailed(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal))
    }
}

// =============================================================================
// Database
// =============================================================================

/// An open session database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, migrates.
    ///
    /// ## Errors
    /// - `ConnectionFailed`: the directory or file could not be created or opened
    /// - `MigrationFailed`: the schema could not be brought up to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening session database");

        let options = config.connect_options()?;

        // No idle reaping: an in-memory database would vanish with its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            let status = migrations::run_migrations(&db.pool).await?;
            debug!(known = status.known, applied = status.applied, "Migrations checked");
        }

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Keyed record access for the session store.
    pub fn records(&self) -> RecordRepository {
        RecordRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later queries fail.
    pub async fn close(&self) {
        debug!("Closing session database");
        self.pool.close().await;
    }

    /// `true` when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Fails with `ConnectionFailed` unless [`health_check`](Self::health_check) passes.
    pub async fn ensure_healthy(&self) -> DbResult<()> {
        if self.health_check().await {
            Ok(())
        } else {
            Err(DbError::ConnectionFailed(
                "session database did not answer".to_string(),
            ))
        }
    }
}
