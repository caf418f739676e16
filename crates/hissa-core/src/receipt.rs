//! # Receipt Formatter
//!
//! Renders a [`Bill`] as plain text for sharing.
//!
//! ## Layout
//! ```text
//! HISSA - Bill summary
//! 2026-10-16 19:30                      ← only when issued_at is set
//!
//! ━━━━━━━━━━━━━━━━━
//! Alice
//! Due: 11,000 so'm
//!
//!   • Taxi (1 pc, split equally among 2)
//!     10,000 so'm
//!
//!   Subtotal: 10,000 so'm
//!   Service (10%): +1,000 so'm
//!
//! ━━━━━━━━━━━━━━━━━
//! Items subtotal: 20,000 so'm
//! Service charge: 2,000 so'm
//! TOTAL: 22,000 so'm
//! ```
//!
//! Participants who owe nothing are left out. Every amount is rounded here
//! and only here. The formatter does no I/O; handing the text to a share or
//! clipboard facility is the caller's job.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::engine::Bill;
use crate::session::Session;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━";

/// Presentation settings for a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptStyle {
    /// First line of the receipt.
    pub title: String,

    /// Label printed after every amount.
    pub currency: String,

    /// When set, printed under the title as `YYYY-MM-DD HH:MM`.
    pub issued_at: Option<DateTime<Utc>>,
}

impl Default for ReceiptStyle {
    fn default() -> Self {
        ReceiptStyle {
            title: "HISSA - Bill summary".to_string(),
            currency: "so'm".to_string(),
            issued_at: None,
        }
    }
}

impl ReceiptStyle {
    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at);
        self
    }
}

/// A bill ready to be written out. Use `to_string()` or [`format_receipt`].
pub struct Receipt<'a> {
    bill: &'a Bill,
    session: &'a Session,
    style: &'a ReceiptStyle,
}

impl<'a> Receipt<'a> {
    pub fn new(bill: &'a Bill, session: &'a Session, style: &'a ReceiptStyle) -> Self {
        Receipt {
            bill,
            session,
            style,
        }
    }
}

impl fmt::Display for Receipt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currency = &self.style.currency;

        writeln!(f, "{}", self.style.title)?;
        if let Some(at) = self.style.issued_at {
            writeln!(f, "{}", at.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(f)?;

        // Session order; the bill may lag behind a participant just added.
        let owing = self
            .session
            .participants()
            .iter()
            .filter_map(|p| self.bill.participant(&p.id))
            .filter(|p| !p.is_empty());

        for person in owing {
            writeln!(f, "{}", SEPARATOR)?;
            writeln!(f, "{}", person.name)?;
            writeln!(f, "Due: {} {}", person.final_due, currency)?;
            writeln!(f)?;

            for line in &person.line_items {
                writeln!(f, "  • {} ({})", line.item_name, line.basis)?;
                writeln!(f, "    {} {}", line.cost, currency)?;
            }

            writeln!(f)?;
            writeln!(f, "  Subtotal: {} {}", person.subtotal, currency)?;
            writeln!(
                f,
                "  Service ({}%): {} {}",
                self.bill.service_rate,
                person.service_share.signed(),
                currency
            )?;
            writeln!(f)?;
        }

        writeln!(f, "{}", SEPARATOR)?;

        let orphaned: Vec<&str> = self
            .bill
            .orphaned_items
            .iter()
            .filter_map(|id| self.session.item(id))
            .map(|item| item.name.as_str())
            .collect();
        if !orphaned.is_empty() {
            writeln!(f, "Not charged to anyone: {}", orphaned.join(", "))?;
        }

        writeln!(f, "Items subtotal: {} {}", self.bill.overall_subtotal, currency)?;
        writeln!(
            f,
            "Service charge: {} {}",
            self.bill.overall_service_amount, currency
        )?;
        write!(f, "TOTAL: {} {}", self.bill.overall_grand_total, currency)
    }
}

/// Formats a bill as shareable text.
///
/// Deterministic for a given bill, session and style.
pub fn format_receipt(bill: &Bill, session: &Session, style: &ReceiptStyle) -> String {
    Receipt::new(bill, session, style).to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
