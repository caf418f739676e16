//! # hissa-db: Session Store for Hissa
//!
//! This crate persists the Hissa session in a local SQLite database using
//! sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Hissa Data Flow                                │
//! │                                                                         │
//! │  CLI command (item add)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hissa-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ SessionStore  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ load / save   │    │ 001_session_ │  │   │
//! │  │   │               │    │ ready gate    │    │ store.sql    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/hissa/hissa.db (platform data dir)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Keyed record storage
//! - [`store`] - The session store and its load-before-save gate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hissa_db::{Database, DbConfig, SessionStore};
//!
//! let db = Database::new(DbConfig::new("path/to/hissa.db")).await?;
//! let (store, mut session) = SessionStore::open(&db, Default::default()).await?;
//!
//! session.add_participant("Alice")?;
//! store.save(&session).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::records::{RecordRepository, SessionRecord};
pub use store::{LoadedSession, SessionStore, StoreState};
