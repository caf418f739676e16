//! # Schema Migrations
//!
//! The session store schema lives in `migrations/sqlite/` at the workspace
//! root and is compiled into the binary.
//!
//! New schema changes go in a new `NNN_name.sql` file. Applied files are
//! checksummed by sqlx, so an edited file fails the next startup.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a database is through the embedded migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migrations compiled into this build.
    pub known: usize,

    /// Migrations recorded as applied in the database.
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

/// Brings the schema up to date. Safe to call on every start.
///
/// ## Errors
/// `MigrationFailed` when a migration fails or the database still reports
/// fewer applied migrations than this build knows.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    debug!(known = MIGRATOR.migrations.len(), "Applying session store schema");
    MIGRATOR.run(pool).await?;

    let status = migration_status(pool).await?;
    if !status.is_current() {
        return Err(DbError::MigrationFailed(format!(
            "{} of {} migrations applied",
            status.applied, status.known
        )));
    }

    info!(applied = status.applied, "Session store schema is current");
    Ok(status)
}

/// Reads the applied count from sqlx's bookkeeping table.
pub(crate) async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = TRUE")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        known: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or_default(),
    })
}
