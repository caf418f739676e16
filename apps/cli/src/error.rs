//! # CLI Error Type
//!
//! Unified error type for `hissa` commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Hissa                                  │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  CliResult<()>                                                          │
//! │         │                                                               │
//! │         ├── CoreError::ParticipantNotFound ──► NOT_FOUND                │
//! │         ├── CoreError::Validation ───────────► VALIDATION_ERROR         │
//! │         ├── DbError::* ──────────────────────► STORAGE_ERROR            │
//! │         ├── ConfigError::* ──────────────────► CONFIG_ERROR             │
//! │         └── ExportOutcome::Failed ───────────► EXPORT_ERROR             │
//! │                                                                         │
//! │  main() prints "error[CODE]: message" to stderr and exits with 1.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use hissa_core::{CoreError, ValidationError};
use hissa_db::DbError;

use crate::config::ConfigError;

/// Error returned from commands.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes, printed in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Participant or item not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Session store operation failed
    StorageError,

    /// Share and clipboard both failed
    ExportError,

    /// Configuration could not be loaded
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::ExportError => "EXPORT_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl CliError {
    /// Creates a new CLI error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, reference: &str) -> Self {
        CliError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, reference),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an export error.
    pub fn export(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ExportError, message)
    }
}

/// Converts store errors to CLI errors.
impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                CliError::new(ErrorCode::StorageError, "Could not open the session store")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                CliError::new(ErrorCode::StorageError, "Session store migration failed")
            }
            DbError::NotReady { state } => CliError::new(
                ErrorCode::Internal,
                format!("Session store not ready (state: {})", state),
            ),
            other => {
                tracing::error!("Session store error: {}", other);
                CliError::new(ErrorCode::StorageError, "Could not save the session")
            }
        }
    }
}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ParticipantNotFound(id) => CliError::not_found("Participant", id.as_str()),
            CoreError::ItemNotFound(id) => CliError::not_found("Item", id.as_str()),
            CoreError::Validation(e) => CliError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::ConfigError, err.to_string())
    }
}

/// Output write failures (closed pipe and the like).
impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(ErrorCode::Internal, err.to_string())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hissa_core::ParticipantId;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err = CliError::from(CoreError::ParticipantNotFound(ParticipantId::from("p1")));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Participant not found: p1");

        let err = CliError::from(CoreError::Validation(ValidationError::NoUnitsAssigned));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_display_includes_code() {
        let err = CliError::validation("name is required");
        assert_eq!(err.to_string(), "error[VALIDATION_ERROR]: name is required");
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = CliError::from(DbError::QueryFailed("disk I/O error".to_string()));
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(!err.message.contains("disk"));
    }
}
