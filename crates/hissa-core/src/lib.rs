//! # hissa-core: Pure Bill Splitting Logic for Hissa
//!
//! This crate is the **heart** of Hissa. It holds the session model, the
//! allocation engine and the receipt formatter as pure code with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Hissa Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    hissa (CLI, clap)                            │   │
//! │  │    participant ──► item ──► service ──► bill / receipt / share  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hissa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  session  │  │  engine   │  │  receipt  │  │ validation│  │   │
//! │  │   │  Session  │  │   Bill    │  │  Receipt  │  │   rules   │  │   │
//! │  │   │  Upsert   │  │ LineItem  │  │   Style   │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLIPBOARD • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hissa-db (Session Store)                     │   │
//! │  │          SQLite records, migrations, load-before-save gate      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Participant, Item, DistributionPolicy, etc.)
//! - [`money`] - Amount type; rounding for display only
//! - [`session`] - The single mutable aggregate and its operations
//! - [`engine`] - `compute_bill`: session in, bill out
//! - [`receipt`] - Plain-text receipt for sharing
//! - [`validation`] - Input rules applied before anything is admitted
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use hissa_core::{compute_bill, format_receipt, DistributionPolicy, ItemDraft, ReceiptStyle, Session};
//!
//! let mut session = Session::new();
//! session.add_participant("Alice").unwrap();
//! session.add_participant("Bob").unwrap();
//! session
//!     .upsert_item(ItemDraft::new("Taxi", "20000", "1", DistributionPolicy::EqualAmongAll), None)
//!     .unwrap();
//!
//! let bill = compute_bill(&session);
//! assert_eq!(bill.overall_grand_total.rounded(), 22_000);
//!
//! let text = format_receipt(&bill, &session, &ReceiptStyle::default());
//! assert!(text.ends_with("TOTAL: 22,000 so'm"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod money;
pub mod receipt;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::{compute_bill, Bill, LineItem, ParticipantBill, ShareBasis};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Amount;
pub use receipt::{format_receipt, Receipt, ReceiptStyle};
pub use session::{Session, Upsert};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Service charge percentage a fresh session starts with.
pub const DEFAULT_SERVICE_CHARGE_RATE: f64 = 10.0;
