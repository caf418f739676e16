//! # Repository Module
//!
//! Database repository implementations for Hissa.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionStore                                                          │
//! │       │                                                                 │
//! │       │  db.records().put("items", json)                               │
//! │       ▼                                                                 │
//! │  RecordRepository                                                      │
//! │  ├── get(&self, key)                                                   │
//! │  ├── put(&self, key, value)                                            │
//! │  ├── put_all(&self, entries)    (one transaction)                      │
//! │  └── delete / delete_all                                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  session_records                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RecordRepository`](records::RecordRepository) - Keyed session records

pub mod records;
