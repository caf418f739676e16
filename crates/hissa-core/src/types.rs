//! # Domain Types
//!
//! Core domain types used throughout Hissa.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌────────────────┐   │
//! │  │  Participant    │   │        Item          │   │ ServiceCharge  │   │
//! │  │  ─────────────  │   │  ──────────────────  │   │ Rate           │   │
//! │  │  id (UUID)      │   │  id (UUID)           │   │ ────────────   │   │
//! │  │  name           │   │  name                │   │ percent (f64)  │   │
//! │  └─────────────────┘   │  unit_price          │   │ 10 = 10%       │   │
//! │          ▲             │  quantity            │   └────────────────┘   │
//! │          │ by id       │  policy ─────────────┼──► DistributionPolicy  │
//! │          └─────────────┤  allocation          │    EqualAmongAll       │
//! │                        └──────────────────────┘    EqualAmongSelected  │
//! │                                                    ByUnitCount         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Allocation Semantics
//! An item's allocation maps participant ids to a number whose meaning
//! depends on the policy. [`Item::shares`] turns the raw map into a [`Shares`]
//! value so the engine matches on the meaning rather than reading numbers.
//!
//! | Policy               | Allocation value       |
//! |----------------------|------------------------|
//! | `EqualAmongAll`      | ignored                |
//! | `EqualAmongSelected` | selection flag, 0 or 1 |
//! | `ByUnitCount`        | units taken            |
//!
//! An allocation may name participants that have since been removed. Nothing
//! cleans those entries up; the engine skips them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Amount;
use crate::DEFAULT_SERVICE_CHARGE_RATE;

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque participant identifier.
///
/// New ids are UUID v4 strings; ids read back from storage are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParticipantId(String);

/// Opaque item identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                $name(Uuid::new_v4().to_string())
            }

            /// Returns the identifier text.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name(s.trim().to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ParticipantId);
string_id!(ItemId);

// =============================================================================
// Participant
// =============================================================================

/// A person among whom costs are divided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Participant {
    /// Immutable identity.
    pub id: ParticipantId,

    /// Display name, trimmed and never empty.
    pub name: String,
}

// =============================================================================
// Distribution Policy
// =============================================================================

/// The rule used to divide an item's cost among participants.
///
/// Older stored sessions use `ALL`, `SPLIT_BY_PERSON` and `BY_UNIT`; those
/// names are still accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionPolicy {
    /// Split evenly across every current participant.
    #[default]
    #[serde(alias = "ALL")]
    EqualAmongAll,

    /// Split evenly across the participants flagged in the allocation.
    #[serde(alias = "SPLIT_BY_PERSON")]
    EqualAmongSelected,

    /// Each participant pays `units × unit_price` for the units they took.
    #[serde(alias = "BY_UNIT")]
    ByUnitCount,
}

impl fmt::Display for DistributionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionPolicy::EqualAmongAll => write!(f, "all"),
            DistributionPolicy::EqualAmongSelected => write!(f, "selected"),
            DistributionPolicy::ByUnitCount => write!(f, "units"),
        }
    }
}

impl FromStr for DistributionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "all" | "equal_among_all" => Ok(DistributionPolicy::EqualAmongAll),
            "selected" | "equal_among_selected" | "split_by_person" => {
                Ok(DistributionPolicy::EqualAmongSelected)
            }
            "units" | "by_unit_count" | "by_unit" => Ok(DistributionPolicy::ByUnitCount),
            other => Err(format!(
                "Unknown distribution policy: '{}'. Valid options: all, selected, units",
                other
            )),
        }
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Per-item map from participant to a policy-dependent number.
///
/// See the module docs for what the number means under each policy. Entries
/// are kept in id order so iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Allocation(BTreeMap<ParticipantId, f64>);

impl Allocation {
    /// Creates an empty allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for a participant, replacing any previous one.
    pub fn set(&mut self, participant: ParticipantId, value: f64) {
        self.0.insert(participant, value);
    }

    /// Builder form of [`Allocation::set`].
    pub fn with(mut self, participant: ParticipantId, value: f64) -> Self {
        self.set(participant, value);
        self
    }

    /// Value recorded for a participant, zero when absent.
    pub fn get(&self, participant: &ParticipantId) -> f64 {
        self.0.get(participant).copied().unwrap_or(0.0)
    }

    /// All entries in id order, including zeros.
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, f64)> {
        self.0.iter().map(|(id, value)| (id, *value))
    }

    /// Entries whose value is strictly positive.
    pub fn positive(&self) -> impl Iterator<Item = (&ParticipantId, f64)> {
        self.iter().filter(|(_, value)| *value > 0.0)
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ParticipantId, f64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, f64)>>(iter: I) -> Self {
        Allocation(iter.into_iter().collect())
    }
}

// =============================================================================
// Item
// =============================================================================

/// A purchased good or service, priced per unit.
///
/// Items are only built by the session model after their draft passed
/// validation, so `quantity > 0` and `unit_price >= 0` hold for every item a
/// session holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable across edits.
    pub id: ItemId,

    pub name: String,

    /// Price of one unit.
    pub unit_price: f64,

    /// Number of units bought. Not required to be whole.
    pub quantity: f64,

    #[serde(alias = "type")]
    pub policy: DistributionPolicy,

    #[serde(default, alias = "details")]
    pub allocation: Allocation,
}

/// How an item's cost is attributed, read off its policy and allocation.
///
/// Participant filtering against the current session happens in the engine;
/// these lists may still hold ids of removed participants.
#[derive(Debug, Clone, PartialEq)]
pub enum Shares<'a> {
    /// Every current participant, equally.
    AllParticipants,

    /// The flagged participants, equally.
    Selected(Vec<&'a ParticipantId>),

    /// Participants with their unit counts.
    Units(Vec<(&'a ParticipantId, f64)>),
}

impl Item {
    /// `unit_price × quantity`.
    pub fn total_cost(&self) -> Amount {
        Amount::new(self.unit_price) * self.quantity
    }

    /// The typed view of this item's allocation under its policy.
    pub fn shares(&self) -> Shares<'_> {
        match self.policy {
            DistributionPolicy::EqualAmongAll => Shares::AllParticipants,
            DistributionPolicy::EqualAmongSelected => {
                Shares::Selected(self.allocation.positive().map(|(id, _)| id).collect())
            }
            DistributionPolicy::ByUnitCount => Shares::Units(self.allocation.positive().collect()),
        }
    }
}

// =============================================================================
// Item Draft
// =============================================================================

/// Raw item input as typed by the user.
///
/// Prices and quantities stay text until validation parses them, so a bad
/// entry is reported against the field instead of failing earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub unit_price: String,
    pub quantity: String,
    pub policy: DistributionPolicy,
    #[serde(default)]
    pub allocation: Allocation,
}

impl Default for ItemDraft {
    fn default() -> Self {
        ItemDraft {
            name: String::new(),
            unit_price: String::new(),
            quantity: "1".to_string(),
            policy: DistributionPolicy::EqualAmongAll,
            allocation: Allocation::new(),
        }
    }
}

impl ItemDraft {
    /// Creates a draft with an empty allocation.
    pub fn new(
        name: impl Into<String>,
        unit_price: impl Into<String>,
        quantity: impl Into<String>,
        policy: DistributionPolicy,
    ) -> Self {
        ItemDraft {
            name: name.into(),
            unit_price: unit_price.into(),
            quantity: quantity.into(),
            policy,
            allocation: Allocation::new(),
        }
    }

    /// Records a selection flag or unit count for a participant.
    pub fn assign(mut self, participant: ParticipantId, value: f64) -> Self {
        self.allocation.set(participant, value);
        self
    }

    /// Flags a participant as selected (value 1).
    pub fn select(self, participant: ParticipantId) -> Self {
        self.assign(participant, 1.0)
    }
}

impl From<&Item> for ItemDraft {
    /// Loads a stored item back into an editable draft.
    fn from(item: &Item) -> Self {
        ItemDraft {
            name: item.name.clone(),
            unit_price: item.unit_price.to_string(),
            quantity: item.quantity.to_string(),
            policy: item.policy,
            allocation: item.allocation.clone(),
        }
    }
}

// =============================================================================
// Service Charge Rate
// =============================================================================

/// Session-wide service charge, as a percentage.
///
/// No bounds are enforced: zero, negative and very large rates are all
/// accepted and applied as given.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServiceChargeRate(f64);

impl ServiceChargeRate {
    /// Creates a rate from a percentage (10.0 = 10%).
    #[inline]
    pub const fn new(percent: f64) -> Self {
        ServiceChargeRate(percent)
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> f64 {
        self.0
    }
}

impl Default for ServiceChargeRate {
    fn default() -> Self {
        ServiceChargeRate(DEFAULT_SERVICE_CHARGE_RATE)
    }
}

/// Shortest form of the percentage: `10`, `12.5`, `-3`.
impl fmt::Display for ServiceChargeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::from(id)
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ParticipantId::generate();
        let b = ParticipantId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_policy_parsing() {
        let parse = |s: &str| s.parse::<DistributionPolicy>().unwrap();
        assert_eq!(parse("all"), DistributionPolicy::EqualAmongAll);
        assert_eq!(parse("Selected"), DistributionPolicy::EqualAmongSelected);
        assert_eq!(parse("by-unit-count"), DistributionPolicy::ByUnitCount);
        assert_eq!(parse("SPLIT_BY_PERSON"), DistributionPolicy::EqualAmongSelected);
        assert!("everyone".parse::<DistributionPolicy>().is_err());
    }

    #[test]
    fn test_policy_wire_names() {
        let json = serde_json::to_string(&DistributionPolicy::EqualAmongSelected).unwrap();
        assert_eq!(json, "\"EQUAL_AMONG_SELECTED\"");

        let legacy: DistributionPolicy = serde_json::from_str("\"BY_UNIT\"").unwrap();
        assert_eq!(legacy, DistributionPolicy::ByUnitCount);
    }

    #[test]
    fn test_shares_view_drops_zero_entries() {
        let item = Item {
            id: ItemId::from("pizza"),
            name: "Pizza".to_string(),
            unit_price: 30_000.0,
            quantity: 1.0,
            policy: DistributionPolicy::EqualAmongSelected,
            allocation: Allocation::new()
                .with(pid("alice"), 1.0)
                .with(pid("bob"), 0.0)
                .with(pid("carol"), 1.0),
        };

        match item.shares() {
            Shares::Selected(ids) => assert_eq!(ids, vec![&pid("alice"), &pid("carol")]),
            other => panic!("unexpected shares: {:?}", other),
        }
    }

    #[test]
    fn test_shares_view_ignores_allocation_for_all() {
        let item = Item {
            id: ItemId::from("taxi"),
            name: "Taxi".to_string(),
            unit_price: 20_000.0,
            quantity: 1.0,
            policy: DistributionPolicy::EqualAmongAll,
            allocation: Allocation::new().with(pid("alice"), 5.0),
        };
        assert_eq!(item.shares(), Shares::AllParticipants);
        assert_eq!(item.total_cost().value(), 20_000.0);
    }

    #[test]
    fn test_item_reads_legacy_field_names() {
        let json = r#"{
            "id": "i1",
            "name": "Beer",
            "unitPrice": 5000,
            "quantity": 10,
            "type": "BY_UNIT",
            "details": {"alice": 3, "bob": 2}
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.policy, DistributionPolicy::ByUnitCount);
        assert_eq!(item.allocation.get(&pid("alice")), 3.0);
        assert_eq!(item.allocation.total(), 5.0);
    }

    #[test]
    fn test_item_writes_current_field_names() {
        let item = Item {
            id: ItemId::from("i1"),
            name: "Tea".to_string(),
            unit_price: 3000.0,
            quantity: 2.0,
            policy: DistributionPolicy::EqualAmongAll,
            allocation: Allocation::new(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["unitPrice"], 3000.0);
        assert_eq!(json["policy"], "EQUAL_AMONG_ALL");
        assert!(json["allocation"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_draft_from_item() {
        let item = Item {
            id: ItemId::from("i1"),
            name: "Beer".to_string(),
            unit_price: 5000.0,
            quantity: 10.0,
            policy: DistributionPolicy::ByUnitCount,
            allocation: Allocation::new().with(pid("alice"), 3.0),
        };
        let draft = ItemDraft::from(&item);
        assert_eq!(draft.unit_price, "5000");
        assert_eq!(draft.quantity, "10");
        assert_eq!(draft.allocation, item.allocation);
    }

    #[test]
    fn test_service_rate_default_and_display() {
        assert_eq!(ServiceChargeRate::default().percent(), 10.0);
        assert_eq!(ServiceChargeRate::new(12.5).to_string(), "12.5");
        assert_eq!(ServiceChargeRate::new(10.0).to_string(), "10");
    }
}
