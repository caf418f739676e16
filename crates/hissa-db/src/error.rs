//! # Database Error Types
//!
//! Error types for session store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)      Malformed record (serde_json::Error)  │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module)           logged by the store, default used     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CliError (in hissa-cli) ← STORAGE_ERROR with a readable message       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::store::StoreState;

/// Session store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file or its directory could not be opened or created.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The embedded schema could not be applied.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A multi-record write could not begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A write was attempted before the stored session was loaded and applied.
    ///
    /// ## When This Occurs
    /// - `save` or `clear` called on a store still `Uninitialized`
    /// - `save` or `clear` called after `load` but before `mark_ready`
    #[error("Session store is not ready for writes (state: {state})")]
    NotReady { state: StoreState },

    /// A value could not be encoded for storage.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Anything sqlx reports that has no variant above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// ## Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
