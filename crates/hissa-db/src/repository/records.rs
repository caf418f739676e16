//! # Session Record Repository
//!
//! Keyed text records in the `session_records` table.
//!
//! The repository knows nothing about what the values mean; encoding and
//! decoding belong to the [`SessionStore`](crate::store::SessionStore).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// One stored record.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SessionRecord {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for session records.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    /// Creates a new RecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RecordRepository { pool }
    }

    /// Gets a record by key.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - Record found
    /// * `Ok(None)` - Nothing stored under this key
    pub async fn get(&self, key: &str) -> DbResult<Option<SessionRecord>> {
        debug!(key = %key, "Reading record");

        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT key, value, updated_at FROM session_records WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts or replaces a record.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        self.put_all(&[(key, value.to_string())]).await
    }

    /// Inserts or replaces several records in one transaction.
    ///
    /// Either every record is written or none is.
    pub async fn put_all(&self, entries: &[(&str, String)]) -> DbResult<()> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (key, value) in entries {
            debug!(key = %key, bytes = value.len(), "Writing record");

            sqlx::query(
                r#"
                INSERT INTO session_records (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(*key)
            .bind(value.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Deletes several records in one transaction.
    ///
    /// ## Returns
    /// Number of deleted records.
    pub async fn delete_all(&self, keys: &[&str]) -> DbResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut deleted = 0;
        for key in keys {
            let result = sqlx::query("DELETE FROM session_records WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(deleted)
    }

    /// Counts stored records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session_records")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
