//! # Session Store
//!
//! Persists the session as three independent records and refuses to write
//! until the stored session has been loaded and applied.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Uninitialized ──load()──► Loaded ──mark_ready()──► Ready             │
//! │        │                      │                        │                │
//! │        │ save/clear           │ save/clear             │ save/clear     │
//! │        ▼                      ▼                        ▼                │
//! │   NotReady error         NotReady error            written              │
//! │                                                                         │
//! │   Writing before the load is applied would replace the stored session  │
//! │   with an empty one.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Records
//! | Key              | Value                                  |
//! |------------------|----------------------------------------|
//! | `participants`   | JSON array of `{id, name}`             |
//! | `items`          | JSON array of items                    |
//! | `service_charge` | the rate as text, e.g. `10`            |
//!
//! Each record is decoded on its own. A malformed one is logged and replaced
//! by its default; the others still load.

use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, info, warn};

use hissa_core::{Item, Participant, ServiceChargeRate, Session};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::records::RecordRepository;

pub const PARTICIPANTS_KEY: &str = "participants";
pub const ITEMS_KEY: &str = "items";
pub const SERVICE_CHARGE_KEY: &str = "service_charge";

const ALL_KEYS: [&str; 3] = [PARTICIPANTS_KEY, ITEMS_KEY, SERVICE_CHARGE_KEY];

/// Where a store is in its load-before-save lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Nothing loaded yet. Writes are refused.
    Uninitialized,

    /// Stored session read but not yet confirmed applied. Writes are refused.
    Loaded,

    /// Writes allowed.
    Ready,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreState::Uninitialized => write!(f, "uninitialized"),
            StoreState::Loaded => write!(f, "loaded"),
            StoreState::Ready => write!(f, "ready"),
        }
    }
}

/// What `load` found.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSession {
    pub session: Session,

    /// Keys whose stored value was malformed, or repeated an id, and was
    /// replaced by a default or trimmed.
    pub recovered: Vec<&'static str>,
}

/// Gated persistence for a single session.
#[derive(Debug)]
pub struct SessionStore {
    records: RecordRepository,
    state: StoreState,
    default_rate: ServiceChargeRate,
}

impl SessionStore {
    /// Creates a store in the `Uninitialized` state.
    pub fn new(records: RecordRepository) -> Self {
        SessionStore {
            records,
            state: StoreState::Uninitialized,
            default_rate: ServiceChargeRate::default(),
        }
    }

    /// Rate used when no service charge record exists or it is malformed.
    pub fn with_default_rate(mut self, rate: ServiceChargeRate) -> Self {
        self.default_rate = rate;
        self
    }

    /// The usual startup path: load, apply, unlock writes.
    ///
    /// ## Returns
    /// A `Ready` store and the session it loaded.
    pub async fn open(db: &Database, default_rate: ServiceChargeRate) -> DbResult<(Self, Session)> {
        let mut store = SessionStore::new(db.records()).with_default_rate(default_rate);
        let loaded = store.load().await?;
        store.mark_ready()?;
        Ok((store, loaded.session))
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Reads the stored session.
    ///
    /// Moves `Uninitialized → Loaded`. Loading again from `Loaded` or `Ready`
    /// re-reads the records and leaves the state unchanged.
    ///
    /// ## Errors
    /// Only database access errors. Malformed records are recovered.
    pub async fn load(&mut self) -> DbResult<LoadedSession> {
        let mut recovered = Vec::new();

        let participants: Vec<Participant> = self
            .read_json(PARTICIPANTS_KEY, &mut recovered)
            .await?
            .unwrap_or_default();

        let items: Vec<Item> = self
            .read_json(ITEMS_KEY, &mut recovered)
            .await?
            .unwrap_or_default();

        let rate = match self.records.get(SERVICE_CHARGE_KEY).await? {
            None => self.default_rate,
            Some(record) => match parse_rate(&record.value) {
                Some(rate) => rate,
                None => {
                    warn!(
                        key = SERVICE_CHARGE_KEY,
                        value = %record.value,
                        "Malformed record, using default"
                    );
                    recovered.push(SERVICE_CHARGE_KEY);
                    self.default_rate
                }
            },
        };

        let (stored_participants, stored_items) = (participants.len(), items.len());
        let session = Session::from_parts(participants, items, rate);

        if session.participants().len() < stored_participants {
            warn!(
                key = PARTICIPANTS_KEY,
                dropped = stored_participants - session.participants().len(),
                "Repeated participant ids, keeping the first"
            );
            recovered.push(PARTICIPANTS_KEY);
        }
        if session.items().len() < stored_items {
            warn!(
                key = ITEMS_KEY,
                dropped = stored_items - session.items().len(),
                "Repeated item ids, keeping the first"
            );
            recovered.push(ITEMS_KEY);
        }

        info!(
            participants = session.participants().len(),
            items = session.items().len(),
            service_charge = %rate,
            recovered = recovered.len(),
            "Session loaded"
        );

        if self.state == StoreState::Uninitialized {
            self.state = StoreState::Loaded;
        }

        Ok(LoadedSession { session, recovered })
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        key: &'static str,
        recovered: &mut Vec<&'static str>,
    ) -> DbResult<Option<T>> {
        let Some(record) = self.records.get(key).await? else {
            debug!(key = key, "No stored record");
            return Ok(None);
        };

        match serde_json::from_str(&record.value) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = key, error = %e, "Malformed record, using default");
                recovered.push(key);
                Ok(None)
            }
        }
    }

    /// Confirms the loaded session was applied. Moves `Loaded → Ready`.
    ///
    /// ## Errors
    /// `NotReady` when called before `load`.
    pub fn mark_ready(&mut self) -> DbResult<()> {
        match self.state {
            StoreState::Uninitialized => Err(DbError::NotReady { state: self.state }),
            StoreState::Loaded | StoreState::Ready => {
                self.state = StoreState::Ready;
                Ok(())
            }
        }
    }

    // =========================================================================
    // Writes (Ready only)
    // =========================================================================

    fn ensure_ready(&self) -> DbResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            warn!(state = %self.state, "Write refused before load completed");
            Err(DbError::NotReady { state: self.state })
        }
    }

    /// Writes all three records in one transaction.
    pub async fn save(&self, session: &Session) -> DbResult<()> {
        self.ensure_ready()?;

        let entries = [
            (
                PARTICIPANTS_KEY,
                serde_json::to_string(session.participants())?,
            ),
            (ITEMS_KEY, serde_json::to_string(session.items())?),
            (
                SERVICE_CHARGE_KEY,
                session.service_charge_rate().to_string(),
            ),
        ];

        self.records.put_all(&entries).await?;

        info!(
            participants = session.participants().len(),
            items = session.items().len(),
            "Session saved"
        );
        Ok(())
    }

    /// Deletes all three records.
    pub async fn clear(&self) -> DbResult<()> {
        self.ensure_ready()?;

        let deleted = self.records.delete_all(&ALL_KEYS).await?;

        info!(deleted = deleted, "Session cleared");
        Ok(())
    }
}

fn parse_rate(text: &str) -> Option<ServiceChargeRate> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite())
        .map(ServiceChargeRate::new)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use hissa_core::{DistributionPolicy, ItemDraft};

    async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_session() -> Session {
        let mut session = Session::new();
        let alice = session.add_participant("Alice").unwrap().id.clone();
        session.add_participant("Bob").unwrap();
        session.set_service_charge_rate(12.5).unwrap();
        session
            .upsert_item(
                ItemDraft::new("Beer", "5000", "10", DistributionPolicy::ByUnitCount)
                    .assign(alice, 3.0),
                None,
            )
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_writes_refused_before_ready() {
        let db = database().await;
        let mut store = SessionStore::new(db.records());
        let session = sample_session();

        assert!(matches!(
            store.save(&session).await,
            Err(DbError::NotReady {
                state: StoreState::Uninitialized
            })
        ));
        assert!(store.mark_ready().is_err());

        store.load().await.unwrap();
        assert_eq!(store.state(), StoreState::Loaded);
        assert!(matches!(
            store.clear().await,
            Err(DbError::NotReady {
                state: StoreState::Loaded
            })
        ));

        store.mark_ready().unwrap();
        store.save(&session).await.unwrap();
        assert_eq!(db.records().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_store_loads_defaults() {
        let db = database().await;
        let (store, session) = SessionStore::open(&db, ServiceChargeRate::default())
            .await
            .unwrap();

        assert!(store.is_ready());
        assert!(session.is_empty());
        assert_eq!(session.service_charge_rate().percent(), 10.0);
    }

    #[tokio::test]
    async fn test_default_rate_applies_only_without_record() {
        let db = database().await;
        let (_, session) = SessionStore::open(&db, ServiceChargeRate::new(15.0))
            .await
            .unwrap();
        assert_eq!(session.service_charge_rate().percent(), 15.0);

        db.records().put(SERVICE_CHARGE_KEY, "5").await.unwrap();
        let (_, session) = SessionStore::open(&db, ServiceChargeRate::new(15.0))
            .await
            .unwrap();
        assert_eq!(session.service_charge_rate().percent(), 5.0);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let db = database().await;
        let session = sample_session();

        let (store, _) = SessionStore::open(&db, ServiceChargeRate::default())
            .await
            .unwrap();
        store.save(&session).await.unwrap();

        let stored = db.records().get(SERVICE_CHARGE_KEY).await.unwrap().unwrap();
        assert_eq!(stored.value, "12.5");

        let (_, reloaded) = SessionStore::open(&db, ServiceChargeRate::default())
            .await
            .unwrap();
        assert_eq!(reloaded, session);
    }

    #[tokio::test]
    async fn test_malformed_record_falls_back_alone() {
        let db = database().await;
        let (store, _) = SessionStore::open(&db, ServiceChargeRate::default())
            .await
            .unwrap();
        store.save(&sample_session()).await.unwrap();
        db.records().put(ITEMS_KEY, "{not json").await.unwrap();

        let mut store = SessionStore::new(db.records());
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.recovered, vec![ITEMS_KEY]);
        assert!(loaded.session.items().is_empty());
        assert_eq!(loaded.session.participants().len(), 2);
        assert_eq!(loaded.session.service_charge_rate().percent(), 12.5);
    }

    #[tokio::test]
    async fn test_malformed_rate_falls_back() {
        let db = database().await;
        db.records().put(SERVICE_CHARGE_KEY, "ten").await.unwrap();

        let mut store = SessionStore::new(db.records());
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.recovered, vec![SERVICE_CHARGE_KEY]);
        assert_eq!(loaded.session.service_charge_rate().percent(), 10.0);
    }

    #[tokio::test]
    async fn test_legacy_item_layout_loads() {
        let db = database().await;
        db.records()
            .put(
                ITEMS_KEY,
                r#"[{"id":"i1","name":"Pizza","unitPrice":30000,"quantity":1,"type":"SPLIT_BY_PERSON","details":{"u1":1}}]"#,
            )
            .await
            .unwrap();

        let mut store = SessionStore::new(db.records());
        let loaded = store.load().await.unwrap();

        assert!(loaded.recovered.is_empty());
        let item = &loaded.session.items()[0];
        assert_eq!(item.policy, DistributionPolicy::EqualAmongSelected);
        assert_eq!(item.allocation.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_participant_ids_keep_the_first() {
        let db = database().await;
        db.records()
            .put(
                PARTICIPANTS_KEY,
                r#"[{"id":"x","name":"Alice"},{"id":"x","name":"Bob"},{"id":"y","name":"Carol"}]"#,
            )
            .await
            .unwrap();

        let mut store = SessionStore::new(db.records());
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.recovered, vec![PARTICIPANTS_KEY]);
        let names: Vec<&str> = loaded
            .session
            .participants()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Alice", "Carol"]);
    }

    #[tokio::test]
    async fn test_clear_removes_records() {
        let db = database().await;
        let (store, _) = SessionStore::open(&db, ServiceChargeRate::default())
            .await
            .unwrap();
        store.save(&sample_session()).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(db.records().count().await.unwrap(), 0);
        assert!(store.is_ready());
    }
}
