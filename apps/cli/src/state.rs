//! # Application State
//!
//! The session, its store and the exporter for one `hissa` invocation.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open():  Database ──► SessionStore::open ──► Session (store Ready)     │
//! │                                                                         │
//! │  commit(mutate):                                                        │
//! │     1. mutate(&mut Session)          error → nothing printed or saved   │
//! │     2. compute_bill(&Session)        full recomputation                 │
//! │     3. print bill summary                                               │
//! │     4. SessionStore::save            load already applied in open()     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use hissa_core::{compute_bill, format_receipt, Bill, CoreResult, Session};
use hissa_db::{Database, DbConfig, SessionStore};

use crate::config::HissaConfig;
use crate::error::CliResult;
use crate::export::{ExportOutcome, ReceiptExporter};
use crate::output;

/// Everything a command needs.
pub struct AppState {
    config: HissaConfig,
    db: Database,
    store: SessionStore,
    session: Session,
    exporter: ReceiptExporter,
}

impl AppState {
    /// Opens the store and applies the stored session.
    ///
    /// `db_override` (from `--db`) wins over the configured path.
    pub async fn open(config: HissaConfig, db_override: Option<PathBuf>) -> CliResult<Self> {
        let path = match db_override {
            Some(path) => path,
            None => config.database_path()?,
        };
        debug!(path = ?path, "Opening session store");

        Self::with_database(config, DbConfig::new(path)).await
    }

    /// Opens against a throwaway in-memory database.
    pub async fn in_memory(config: HissaConfig) -> CliResult<Self> {
        Self::with_database(config, DbConfig::in_memory()).await
    }

    async fn with_database(config: HissaConfig, db_config: DbConfig) -> CliResult<Self> {
        let db = Database::new(db_config).await?;
        db.ensure_healthy().await?;
        let (store, session) = SessionStore::open(&db, config.default_service_rate()).await?;
        let exporter = ReceiptExporter::from_config(&config.export);

        Ok(AppState {
            config,
            db,
            store,
            session,
            exporter,
        })
    }

    pub fn config(&self) -> &HissaConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Computes the bill for the current session.
    pub fn bill(&self) -> Bill {
        compute_bill(&self.session)
    }

    /// Applies a mutation, prints the new bill, then persists.
    ///
    /// ## Errors
    /// The mutation's error (session unchanged, nothing written) or a
    /// storage error from the save.
    pub async fn commit<T>(
        &mut self,
        out: &mut impl Write,
        mutate: impl FnOnce(&mut Session) -> CoreResult<T>,
    ) -> CliResult<T> {
        let result = mutate(&mut self.session)?;

        let bill = self.bill();
        output::write_bill(out, &bill, &self.session, &self.config.receipt.currency)?;

        self.store.save(&self.session).await?;
        Ok(result)
    }

    /// Clears the store and restores a default session.
    pub async fn reset(&mut self) -> CliResult<()> {
        self.store.clear().await?;

        self.session.reset();
        self.session
            .set_service_charge_rate(self.config.session.default_service_rate)?;

        Ok(())
    }

    /// The receipt text for the current session.
    pub fn receipt(&self) -> String {
        let style = self.config.receipt_style(Utc::now());
        format_receipt(&self.bill(), &self.session, &style)
    }

    /// Shares the current receipt, falling back to the clipboard.
    pub async fn share(&self) -> ExportOutcome {
        self.exporter.export(&self.receipt()).await
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hissa_core::{DistributionPolicy, ItemDraft};

    #[tokio::test]
    async fn test_commit_prints_bill() {
        let mut state = AppState::in_memory(HissaConfig::default()).await.unwrap();
        let mut out = Vec::new();

        state
            .commit(&mut out, |s| s.add_participant("Alice").map(|_| ()))
            .await
            .unwrap();
        state
            .commit(&mut out, |s| {
                s.upsert_item(
                    ItemDraft::new("Taxi", "20000", "1", DistributionPolicy::EqualAmongAll),
                    None,
                )
                .map(|_| ())
            })
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Alice"));
        assert!(text.contains("22,000 so'm"));
        assert_eq!(state.bill().overall_grand_total.rounded(), 22_000);
    }

    #[tokio::test]
    async fn test_failed_mutation_prints_nothing() {
        let mut state = AppState::in_memory(HissaConfig::default()).await.unwrap();
        let mut out = Vec::new();

        let result = state.commit(&mut out, |s| s.add_participant("  ").map(|_| ())).await;

        assert!(result.is_err());
        assert!(out.is_empty());
        assert!(state.session().is_empty());
    }

    #[tokio::test]
    async fn test_reset_uses_configured_rate() {
        let mut config = HissaConfig::default();
        config.session.default_service_rate = 15.0;
        let mut state = AppState::in_memory(config).await.unwrap();
        let mut out = Vec::new();

        state
            .commit(&mut out, |s| s.set_service_charge_rate(5.0).map(|_| ()))
            .await
            .unwrap();
        state.reset().await.unwrap();

        assert!(state.session().is_empty());
        assert_eq!(state.session().service_charge_rate().percent(), 15.0);
    }

    #[tokio::test]
    async fn test_receipt_without_timestamp() {
        let mut config = HissaConfig::default();
        config.receipt.include_timestamp = false;
        let state = AppState::in_memory(config).await.unwrap();

        assert_eq!(
            state.receipt(),
            "HISSA - Bill summary\n\n━━━━━━━━━━━━━━━━━\nItems subtotal: 0 so'm\nService charge: 0 so'm\nTOTAL: 0 so'm"
        );
    }
}
