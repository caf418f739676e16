//! # Error Types
//!
//! Domain-specific error types for hissa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hissa-core errors (this file)                                         │
//! │  ├── CoreError        - Session model failures                         │
//! │  └── ValidationError  - Draft rejected before admission                │
//! │                                                                         │
//! │  hissa-db errors (separate crate)                                      │
//! │  └── DbError          - Store failures, write before load              │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the user sees                             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The allocation engine has no error type: it is total over any session the
//! model admitted.

use thiserror::Error;

use crate::types::{ItemId, ParticipantId};

// =============================================================================
// Core Error
// =============================================================================

/// Session model errors.
///
/// A failed operation always leaves the session exactly as it was.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No participant with this id is in the session.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// No item with this id is in the session.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the rule that was violated so the caller can point the
/// user at the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Text did not parse to a finite number.
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Equal-among-selected entry that is neither 0 nor 1.
    #[error("a selection must be 0 or 1, got '{value}'")]
    InvalidSelection { value: String },

    /// Equal-among-selected item with nobody selected.
    #[error("select at least one participant")]
    NoParticipantSelected,

    /// By-unit-count item with no units handed out.
    #[error("assign at least one unit to a participant")]
    NoUnitsAssigned,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
