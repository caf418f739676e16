//! # Validation Module
//!
//! Input validation for the session model.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                   │
//! │  ├── Argument presence and shape                                       │
//! │  └── Immediate usage errors                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Session model                                                │
//! │  └── THIS MODULE: every draft checked before it is admitted            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Allocation engine                                                     │
//! │  └── Trusts the session; never fails                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hissa_core::validation::{parse_quantity, validate_participant_name};
//!
//! assert_eq!(validate_participant_name("  Alice ").unwrap(), "Alice");
//! assert_eq!(parse_quantity("2.5").unwrap(), 2.5);
//! assert!(parse_quantity("0").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Allocation, DistributionPolicy, ItemDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// The numeric fields of a draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidItem {
    pub name: String,
    pub unit_price: f64,
    pub quantity: f64,
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a participant name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
pub fn validate_participant_name(name: &str) -> ValidationResult<String> {
    required("name", name)
}

/// Validates an item name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    required("name", name)
}

fn required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses text into a finite number.
fn parse_number(field: &str, text: &str) -> ValidationResult<f64> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: trimmed.to_string(),
        }),
    }
}

/// Parses a unit price.
///
/// ## Rules
/// - Must be a finite number
/// - Must be non-negative (zero is allowed: free items)
///
/// ## Example
/// ```rust
/// use hissa_core::validation::parse_unit_price;
///
/// assert_eq!(parse_unit_price("20000").unwrap(), 20000.0);
/// assert!(parse_unit_price("0").is_ok());
/// assert!(parse_unit_price("-5").is_err());
/// assert!(parse_unit_price("cheap").is_err());
/// ```
pub fn parse_unit_price(text: &str) -> ValidationResult<f64> {
    let price = parse_number("unit price", text)?;

    if price < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "unit price".to_string(),
        });
    }

    Ok(price)
}

/// Parses a quantity.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0); fractional quantities are allowed
pub fn parse_quantity(text: &str) -> ValidationResult<f64> {
    let quantity = parse_number("quantity", text)?;

    if quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(quantity)
}

/// Parses a service charge rate.
///
/// ## Rules
/// - Must be a finite number
/// - Nothing else: zero, negative and large rates are the caller's business
pub fn parse_service_charge_rate(text: &str) -> ValidationResult<f64> {
    parse_number("service charge", text)
}

/// Checks a service charge rate that arrived as a number.
pub fn validate_service_charge_rate(rate: f64) -> ValidationResult<f64> {
    if !rate.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: "service charge".to_string(),
            value: rate.to_string(),
        });
    }

    Ok(rate)
}

// =============================================================================
// Allocation Validators
// =============================================================================

/// Validates an allocation against the policy it will be read under.
///
/// ## Rules
/// - Every value must be finite and non-negative
/// - `EqualAmongSelected`: every entry is 0 or 1, at least one is 1
/// - `ByUnitCount`: sum of entries > 0
/// - `EqualAmongAll`: the map is not consulted beyond the value check
///
/// Entries may name any participant id; whether the participant still
/// exists is the engine's concern, not admission's.
pub fn validate_allocation(
    policy: DistributionPolicy,
    allocation: &Allocation,
) -> ValidationResult<()> {
    for (_, value) in allocation.iter() {
        if !value.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: "allocation".to_string(),
                value: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "allocation".to_string(),
            });
        }
    }

    match policy {
        DistributionPolicy::EqualAmongAll => Ok(()),
        DistributionPolicy::EqualAmongSelected => {
            if let Some((_, value)) = allocation.iter().find(|(_, v)| *v != 0.0 && *v != 1.0) {
                return Err(ValidationError::InvalidSelection {
                    value: value.to_string(),
                });
            }
            if allocation.positive().next().is_none() {
                Err(ValidationError::NoParticipantSelected)
            } else {
                Ok(())
            }
        }
        DistributionPolicy::ByUnitCount => {
            if allocation.total() > 0.0 {
                Ok(())
            } else {
                Err(ValidationError::NoUnitsAssigned)
            }
        }
    }
}

/// Validates a whole item draft.
///
/// Fields are checked in form order (name, price, quantity, allocation) and
/// the first violation is reported.
pub fn validate_item_draft(draft: &ItemDraft) -> ValidationResult<ValidItem> {
    let name = validate_item_name(&draft.name)?;
    let unit_price = parse_unit_price(&draft.unit_price)?;
    let quantity = parse_quantity(&draft.quantity)?;
    validate_allocation(draft.policy, &draft.allocation)?;

    Ok(ValidItem {
        name,
        unit_price,
        quantity,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
