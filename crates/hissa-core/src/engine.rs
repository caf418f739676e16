//! # Allocation Engine
//!
//! Turns a session into a [`Bill`]: who pays what, for which item, and why.
//!
//! ## Per-Item Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for item in session.items (list order)                                 │
//! │      total = unit_price × quantity                                      │
//! │                                                                         │
//! │      EqualAmongAll       n = #participants                              │
//! │                          n = 0 → orphaned                               │
//! │                          each pays total / n, subtotal += total         │
//! │                                                                         │
//! │      EqualAmongSelected  k = #flagged ids still in the session          │
//! │                          k = 0 → orphaned                               │
//! │                          each pays total / k, subtotal += total         │
//! │                                                                         │
//! │      ByUnitCount         for each id still in the session, units > 0:   │
//! │                          pays units × unit_price, subtotal += that      │
//! │                          nobody left → orphaned                         │
//! │                                                                         │
//! │  service  = subtotal × rate / 100                                       │
//! │  grand    = subtotal × (1 + rate / 100)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Orphaned Items
//! An item nobody can pay for (no participants, or every flagged / unit
//! holding participant was removed) contributes zero everywhere. Its cost is
//! dropped, never spread over the others. [`Bill::orphaned_items`] lists such
//! items so a caller can point them out.
//!
//! ## Unit Counts vs Quantity
//! Under `ByUnitCount` the distributed total is `Σ units × unit_price`, which
//! need not equal `unit_price × quantity`: unassigned units are simply not
//! billed, and over-assignment is billed as assigned.
//!
//! The engine never rounds and never fails; computing twice from the same
//! session gives bit-identical bills.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use ts_rs::TS;

use crate::money::Amount;
use crate::session::Session;
use crate::types::{ItemId, ParticipantId, ServiceChargeRate, Shares};

// =============================================================================
// Bill Types
// =============================================================================

/// Why a participant was charged what they were for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShareBasis {
    /// Split equally among every participant.
    EqualAmongAll { participants: usize, quantity: f64 },

    /// Split equally among the selected participants.
    EqualAmongSelected { participants: usize, quantity: f64 },

    /// Paid for the units taken.
    Units { units: f64 },
}

fn pieces(count: f64) -> String {
    if count == 1.0 {
        "1 pc".to_string()
    } else {
        format!("{} pcs", count)
    }
}

/// Short human-readable description, e.g. `2 pcs, split equally among 3`.
impl fmt::Display for ShareBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareBasis::EqualAmongAll {
                participants,
                quantity,
            } => write!(
                f,
                "{}, split equally among {}",
                pieces(*quantity),
                participants
            ),
            ShareBasis::EqualAmongSelected {
                participants,
                quantity,
            } => write!(
                f,
                "{}, split among {} selected",
                pieces(*quantity),
                participants
            ),
            ShareBasis::Units { units } if *units == 1.0 => write!(f, "1 unit"),
            ShareBasis::Units { units } => write!(f, "{} units", units),
        }
    }
}

/// One item's charge on one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub cost: Amount,
    pub basis: ShareBasis,
}

impl LineItem {
    pub fn description(&self) -> String {
        self.basis.to_string()
    }
}

/// Everything one participant owes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantBill {
    pub participant_id: ParticipantId,
    pub name: String,

    /// In item list order.
    pub line_items: Vec<LineItem>,

    /// Sum of `line_items` costs.
    pub subtotal: Amount,

    /// `subtotal × rate / 100`.
    pub service_share: Amount,

    /// `subtotal + service_share`.
    pub final_due: Amount,
}

impl ParticipantBill {
    /// True when nothing was charged: zero subtotal and no line items.
    pub fn is_empty(&self) -> bool {
        self.subtotal.is_zero() && self.line_items.is_empty()
    }
}

/// The computed bill for a session. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub service_rate: ServiceChargeRate,

    /// One entry per participant, in session order.
    pub participants: Vec<ParticipantBill>,

    pub overall_subtotal: Amount,
    pub overall_service_amount: Amount,
    pub overall_grand_total: Amount,

    /// Items that contributed nothing because nobody could pay for them.
    pub orphaned_items: Vec<ItemId>,
}

impl Bill {
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantBill> {
        self.participants.iter().find(|p| &p.participant_id == id)
    }

    /// Costs charged for one item, summed over participants.
    pub fn item_total(&self, id: &ItemId) -> Amount {
        self.participants
            .iter()
            .flat_map(|p| p.line_items.iter())
            .filter(|line| &line.item_id == id)
            .map(|line| line.cost)
            .sum()
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Computes the bill for a session.
///
/// Deterministic, side-effect free and total: any session the model admitted
/// produces a bill.
///
/// ## Example
/// ```rust
/// use hissa_core::engine::compute_bill;
/// use hissa_core::session::Session;
/// use hissa_core::types::{DistributionPolicy, ItemDraft};
///
/// let mut session = Session::new();
/// let alice = session.add_participant("Alice").unwrap().id.clone();
/// session.add_participant("Bob").unwrap();
/// session
///     .upsert_item(ItemDraft::new("Taxi", "20000", "1", DistributionPolicy::EqualAmongAll), None)
///     .unwrap();
///
/// let bill = compute_bill(&session);
/// assert_eq!(bill.participant(&alice).unwrap().final_due.rounded(), 11_000);
/// assert_eq!(bill.overall_grand_total.rounded(), 22_000);
/// ```
pub fn compute_bill(session: &Session) -> Bill {
    let rate = session.service_charge_rate();

    let mut participants: Vec<ParticipantBill> = session
        .participants()
        .iter()
        .map(|p| ParticipantBill {
            participant_id: p.id.clone(),
            name: p.name.clone(),
            line_items: Vec::new(),
            subtotal: Amount::zero(),
            service_share: Amount::zero(),
            final_due: Amount::zero(),
        })
        .collect();

    let mut index: HashMap<&ParticipantId, usize> = HashMap::new();
    for (slot, p) in session.participants().iter().enumerate() {
        index.entry(&p.id).or_insert(slot);
    }
    let everyone = participants.len();

    let mut overall_subtotal = Amount::zero();
    let mut orphaned_items = Vec::new();

    for item in session.items() {
        let total = item.total_cost();
        let mut charge = |slot: usize, cost: Amount, basis: ShareBasis| {
            let bill = &mut participants[slot];
            bill.subtotal += cost;
            bill.line_items.push(LineItem {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                cost,
                basis,
            });
        };

        let charged = match item.shares() {
            Shares::AllParticipants => {
                let n = everyone;
                if n > 0 {
                    let share = total / n;
                    for slot in 0..n {
                        charge(
                            slot,
                            share,
                            ShareBasis::EqualAmongAll {
                                participants: n,
                                quantity: item.quantity,
                            },
                        );
                    }
                    overall_subtotal += total;
                }
                n > 0
            }
            Shares::Selected(ids) => {
                let slots: Vec<usize> = ids
                    .iter()
                    .filter_map(|id| index.get(id).copied())
                    .collect();
                let k = slots.len();
                if k > 0 {
                    let share = total / k;
                    for slot in slots {
                        charge(
                            slot,
                            share,
                            ShareBasis::EqualAmongSelected {
                                participants: k,
                                quantity: item.quantity,
                            },
                        );
                    }
                    overall_subtotal += total;
                }
                k > 0
            }
            Shares::Units(pairs) => {
                let mut any = false;
                for (id, units) in pairs {
                    if let Some(&slot) = index.get(id) {
                        let cost = Amount::new(item.unit_price) * units;
                        charge(slot, cost, ShareBasis::Units { units });
                        overall_subtotal += cost;
                        any = true;
                    }
                }
                any
            }
        };

        if !charged {
            orphaned_items.push(item.id.clone());
        }
    }

    for bill in &mut participants {
        bill.service_share = bill.subtotal.service_charge(rate);
        bill.final_due = bill.subtotal + bill.service_share;
    }

    Bill {
        service_rate: rate,
        participants,
        overall_subtotal,
        overall_service_amount: overall_subtotal.service_charge(rate),
        overall_grand_total: overall_subtotal.with_service_charge(rate),
        orphaned_items,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
