//! # Money Module
//!
//! Provides the `Amount` type for the costs flowing through the bill.
//!
//! ## Compute Unrounded, Display Rounded
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  Engine:     30000 / 3 = 10000.0, 10000 / 3 = 3333.333...               │
//! │              Shares stay unrounded so they add back up to the item.     │
//! │                                                                         │
//! │  Receipt:    3333.333... → "3,333"                                      │
//! │              Rounding happens ONLY here, on the way to the screen.      │
//! │                                                                         │
//! │  A rounded value never feeds back into a computation. Recomputing the  │
//! │  bill from the same session always yields bit-identical amounts.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hissa_core::money::Amount;
//!
//! let share = Amount::new(10_000.0) / 3;
//! assert_eq!(share.rounded(), 3333);
//! assert_eq!(Amount::new(1_234_567.8).to_string(), "1,234,568");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul};
use ts_rs::TS;

use crate::types::ServiceChargeRate;

// =============================================================================
// Amount Type
// =============================================================================

/// A monetary value in whole currency units, kept at full `f64` precision.
///
/// ## Design Decisions
/// - **f64**: shares like 10000 / 3 have no exact representation in any
///   integer unit; the bill keeps them exact-as-possible and rounds on display
/// - **Single field tuple struct**: serializes as a bare JSON number
/// - **No currency**: one session, one currency, named by the receipt style
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Amount(f64);

impl Amount {
    /// Wraps a raw value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Amount(value)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0.0)
    }

    /// Returns the raw, unrounded value.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Checks if the value is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Rounds to the nearest whole currency unit, halves away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use hissa_core::money::Amount;
    ///
    /// assert_eq!(Amount::new(2.5).rounded(), 3);
    /// assert_eq!(Amount::new(-2.5).rounded(), -3);
    /// assert_eq!(Amount::new(1999.49).rounded(), 1999);
    /// ```
    #[inline]
    pub fn rounded(&self) -> i64 {
        self.0.round() as i64
    }

    /// Display text with an explicit sign: `+` unless the rounded value is
    /// below zero.
    ///
    /// ```rust
    /// use hissa_core::money::Amount;
    ///
    /// assert_eq!(Amount::new(1_000.0).signed(), "+1,000");
    /// assert_eq!(Amount::new(-1_000.0).signed(), "-1,000");
    /// assert_eq!(Amount::zero().signed(), "+0");
    /// ```
    pub fn signed(&self) -> String {
        let rounded = self.rounded();
        if rounded < 0 {
            group_thousands(rounded)
        } else {
            format!("+{}", group_thousands(rounded))
        }
    }

    /// The service charge on this amount: `amount × rate / 100`.
    ///
    /// ## Example
    /// ```rust
    /// use hissa_core::money::Amount;
    /// use hissa_core::types::ServiceChargeRate;
    ///
    /// let service = Amount::new(20_000.0).service_charge(ServiceChargeRate::new(10.0));
    /// assert_eq!(service.rounded(), 2_000);
    /// ```
    pub fn service_charge(&self, rate: ServiceChargeRate) -> Amount {
        Amount(self.0 * (rate.percent() / 100.0))
    }

    /// The amount with service charge applied: `amount × (1 + rate / 100)`.
    pub fn with_service_charge(&self, rate: ServiceChargeRate) -> Amount {
        Amount(self.0 * (1.0 + rate.percent() / 100.0))
    }
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Formats a whole number with `,` thousands separators.
///
/// ## Example
/// ```rust
/// use hissa_core::money::group_thousands;
///
/// assert_eq!(group_thousands(0), "0");
/// assert_eq!(group_thousands(22_000), "22,000");
/// assert_eq!(group_thousands(-1_500), "-1,500");
/// ```
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Display shows the rounded, grouped value: `Amount::new(22000.4)` → `22,000`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&group_thousands(self.rounded()))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Multiplication by a count (unit price × units, unit price × quantity).
impl Mul<f64> for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f64) -> Self {
        Amount(self.0 * factor)
    }
}

/// Division into equal shares.
impl Div<usize> for Amount {
    type Output = Self;

    #[inline]
    fn div(self, parts: usize) -> Self {
        Amount(self.0 / parts as f64)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
