//! # Session Model
//!
//! The single owned aggregate of participants, items and service charge, and
//! the only way to change them.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  User Action             Operation                  State Change        │
//! │  ───────────             ─────────                  ────────────        │
//! │                                                                         │
//! │  Add person ───────────► add_participant() ───────► participants.push  │
//! │                                                                         │
//! │  Remove person ────────► remove_participant() ────► participants.remove│
//! │                          (allocations untouched)                        │
//! │                                                                         │
//! │  Save item form ───────► upsert_item(draft, None) ► items.push         │
//! │                                                                         │
//! │  Save edited item ─────► upsert_item(draft, id) ──► items[i] = item    │
//! │                                                                         │
//! │  Delete item ──────────► remove_item() ───────────► items.remove       │
//! │                                                                         │
//! │  Change service % ─────► set_service_charge_rate()                     │
//! │                                                                         │
//! │  Start over ───────────► reset()                                       │
//! │                                                                         │
//! │  Every operation validates first; a rejected one changes nothing.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Item, ItemDraft, ItemId, Participant, ParticipantId, ServiceChargeRate};
use crate::validation::{self, validate_item_draft};

/// What `upsert_item` did with the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// Appended as a new item.
    Inserted(ItemId),

    /// Replaced the item with this id, in place.
    Replaced(ItemId),
}

impl Upsert {
    /// Id of the stored item either way.
    pub fn id(&self) -> &ItemId {
        match self {
            Upsert::Inserted(id) | Upsert::Replaced(id) => id,
        }
    }
}

/// Participants, items and the service charge rate.
///
/// ## Invariants
/// - Participant and item ids are unique
/// - Every item passed draft validation when it was stored
/// - Item allocations may reference removed participants
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    participants: Vec<Participant>,
    items: Vec<Item>,
    service_charge_rate: ServiceChargeRate,
}

impl Session {
    /// Creates an empty session with the default service charge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassembles a session from previously stored parts.
    ///
    /// Item fields are trusted: they were validated when first admitted.
    /// Ids are not. A repeated participant or item id keeps only its first
    /// occurrence.
    pub fn from_parts(
        participants: Vec<Participant>,
        items: Vec<Item>,
        service_charge_rate: ServiceChargeRate,
    ) -> Self {
        let mut seen = HashSet::new();
        let participants = participants
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();

        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        Session {
            participants,
            items,
            service_charge_rate,
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Participants in the order they were added.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Items in list order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn service_charge_rate(&self) -> ServiceChargeRate {
        self.service_charge_rate
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Checks if there are no participants and no items.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.items.is_empty()
    }

    // =========================================================================
    // Participants
    // =========================================================================

    /// Adds a participant under a freshly generated id.
    ///
    /// ## Errors
    /// `Validation(Required)` when the name is blank.
    pub fn add_participant(&mut self, name: &str) -> CoreResult<&Participant> {
        let name = validation::validate_participant_name(name)?;

        self.participants.push(Participant {
            id: ParticipantId::generate(),
            name,
        });

        let index = self.participants.len() - 1;
        Ok(&self.participants[index])
    }

    /// Removes a participant.
    ///
    /// Items that reference the participant keep their allocation entries;
    /// the engine stops counting them from the next computation on.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> CoreResult<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CoreError::ParticipantNotFound(id.clone()))?;

        Ok(self.participants.remove(index))
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Validates a draft and stores it.
    ///
    /// ## Behavior
    /// - `editing` names an existing item: replaced at the same position,
    ///   keeping its id
    /// - otherwise (no id, or an id no longer present): appended under a
    ///   freshly generated id
    ///
    /// ## Errors
    /// The first `ValidationError` found in the draft. The session is
    /// untouched.
    pub fn upsert_item(&mut self, draft: ItemDraft, editing: Option<&ItemId>) -> CoreResult<Upsert> {
        let valid = validate_item_draft(&draft)?;

        let position = editing.and_then(|id| self.items.iter().position(|i| &i.id == id));
        let id = match position {
            Some(index) => self.items[index].id.clone(),
            None => ItemId::generate(),
        };

        let item = Item {
            id: id.clone(),
            name: valid.name,
            unit_price: valid.unit_price,
            quantity: valid.quantity,
            policy: draft.policy,
            allocation: draft.allocation,
        };

        match position {
            Some(index) => {
                self.items[index] = item;
                Ok(Upsert::Replaced(id))
            }
            None => {
                self.items.push(item);
                Ok(Upsert::Inserted(id))
            }
        }
    }

    /// Removes an item.
    pub fn remove_item(&mut self, id: &ItemId) -> CoreResult<Item> {
        let index = self
            .items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| CoreError::ItemNotFound(id.clone()))?;

        Ok(self.items.remove(index))
    }

    /// Loads an item back into an editable draft.
    pub fn draft_from_item(&self, id: &ItemId) -> CoreResult<ItemDraft> {
        self.item(id)
            .map(ItemDraft::from)
            .ok_or_else(|| CoreError::ItemNotFound(id.clone()))
    }

    // =========================================================================
    // Service Charge & Reset
    // =========================================================================

    /// Sets the service charge percentage.
    ///
    /// Any finite value is accepted, including zero and negatives.
    pub fn set_service_charge_rate(&mut self, percent: f64) -> CoreResult<ServiceChargeRate> {
        let percent = validation::validate_service_charge_rate(percent)?;
        self.service_charge_rate = ServiceChargeRate::new(percent);
        Ok(self.service_charge_rate)
    }

    /// Clears participants and items and restores the default rate.
    pub fn reset(&mut self) {
        *self = Session::new();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::DistributionPolicy;

    fn session_with(names: &[&str]) -> (Session, Vec<ParticipantId>) {
        let mut session = Session::new();
        let ids = names
            .iter()
            .map(|n| session.add_participant(n).unwrap().id.clone())
            .collect();
        (session, ids)
    }

    fn taxi() -> ItemDraft {
        ItemDraft::new("Taxi", "20000", "1", DistributionPolicy::EqualAmongAll)
    }

    #[test]
    fn test_add_participant() {
        let mut session = Session::new();
        let alice = session.add_participant("  Alice ").unwrap().clone();

        assert_eq!(alice.name, "Alice");
        assert_eq!(session.participants().len(), 1);
        assert_eq!(session.participant(&alice.id), Some(&alice));
    }

    #[test]
    fn test_add_blank_participant_is_rejected() {
        let mut session = Session::new();
        let err = session.add_participant("   ").unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
        assert!(session.participants().is_empty());
    }

    #[test]
    fn test_remove_participant_keeps_allocations() {
        let (mut session, ids) = session_with(&["Alice", "Bob"]);
        let draft = ItemDraft::new("Pizza", "30000", "1", DistributionPolicy::EqualAmongSelected)
            .select(ids[0].clone())
            .select(ids[1].clone());
        let item_id = session.upsert_item(draft, None).unwrap().id().clone();

        let removed = session.remove_participant(&ids[0]).unwrap();
        assert_eq!(removed.name, "Alice");
        assert_eq!(session.participants().len(), 1);

        let item = session.item(&item_id).unwrap();
        assert_eq!(item.allocation.get(&ids[0]), 1.0);
        assert_eq!(item.allocation.len(), 2);
    }

    #[test]
    fn test_remove_unknown_participant() {
        let (mut session, _) = session_with(&["Alice"]);
        let err = session
            .remove_participant(&ParticipantId::from("ghost"))
            .unwrap_err();

        assert!(matches!(err, CoreError::ParticipantNotFound(_)));
        assert_eq!(session.participants().len(), 1);
    }

    #[test]
    fn test_upsert_appends_new_items() {
        let (mut session, _) = session_with(&["Alice"]);
        let first = session.upsert_item(taxi(), None).unwrap();
        let second = session.upsert_item(taxi(), None).unwrap();

        assert!(matches!(first, Upsert::Inserted(_)));
        assert_ne!(first.id(), second.id());
        assert_eq!(session.items().len(), 2);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let (mut session, _) = session_with(&["Alice"]);
        let a = session.upsert_item(taxi(), None).unwrap().id().clone();
        let b = session.upsert_item(taxi(), None).unwrap().id().clone();
        let c = session.upsert_item(taxi(), None).unwrap().id().clone();

        let edited = ItemDraft::new("Bus", "5000", "2", DistributionPolicy::EqualAmongAll);
        let outcome = session.upsert_item(edited, Some(&b)).unwrap();

        assert_eq!(outcome, Upsert::Replaced(b.clone()));
        let ids: Vec<_> = session.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![a, b.clone(), c]);

        let item = session.item(&b).unwrap();
        assert_eq!(item.name, "Bus");
        assert_eq!(item.quantity, 2.0);
    }

    #[test]
    fn test_upsert_with_stale_editing_id_appends() {
        let (mut session, _) = session_with(&["Alice"]);
        let stale = ItemId::from("deleted-meanwhile");
        let outcome = session.upsert_item(taxi(), Some(&stale)).unwrap();

        assert!(matches!(outcome, Upsert::Inserted(ref id) if id != &stale));
        assert_eq!(session.items().len(), 1);
    }

    #[test]
    fn test_invalid_draft_leaves_session_unchanged() {
        let (mut session, _) = session_with(&["Alice"]);
        let id = session.upsert_item(taxi(), None).unwrap().id().clone();
        let before = session.clone();

        let bad = ItemDraft::new("Taxi", "20000", "0", DistributionPolicy::EqualAmongAll);
        assert!(session.upsert_item(bad, Some(&id)).is_err());

        let no_selection =
            ItemDraft::new("Pizza", "30000", "1", DistributionPolicy::EqualAmongSelected);
        assert!(matches!(
            session.upsert_item(no_selection, None),
            Err(CoreError::Validation(ValidationError::NoParticipantSelected))
        ));

        let no_units = ItemDraft::new("Beer", "5000", "10", DistributionPolicy::ByUnitCount);
        assert!(matches!(
            session.upsert_item(no_units, None),
            Err(CoreError::Validation(ValidationError::NoUnitsAssigned))
        ));

        assert_eq!(session, before);
    }

    #[test]
    fn test_remove_item() {
        let (mut session, _) = session_with(&["Alice"]);
        let id = session.upsert_item(taxi(), None).unwrap().id().clone();

        assert_eq!(session.remove_item(&id).unwrap().name, "Taxi");
        assert!(session.items().is_empty());
        assert!(matches!(
            session.remove_item(&id),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_draft_from_item_round_trips_through_upsert() {
        let (mut session, ids) = session_with(&["Alice", "Bob"]);
        let draft = ItemDraft::new("Beer", "5000", "10", DistributionPolicy::ByUnitCount)
            .assign(ids[0].clone(), 3.0)
            .assign(ids[1].clone(), 2.0);
        let id = session.upsert_item(draft, None).unwrap().id().clone();
        let before = session.clone();

        let reloaded = session.draft_from_item(&id).unwrap();
        session.upsert_item(reloaded, Some(&id)).unwrap();

        assert_eq!(session, before);
    }

    #[test]
    fn test_service_charge_rate() {
        let mut session = Session::new();
        assert_eq!(session.service_charge_rate().percent(), 10.0);

        session.set_service_charge_rate(-5.0).unwrap();
        assert_eq!(session.service_charge_rate().percent(), -5.0);

        assert!(session.set_service_charge_rate(f64::INFINITY).is_err());
        assert_eq!(session.service_charge_rate().percent(), -5.0);
    }

    #[test]
    fn test_from_parts_keeps_first_of_repeated_ids() {
        let shared = ParticipantId::from("x");
        let participants = vec![
            Participant { id: shared.clone(), name: "Alice".to_string() },
            Participant { id: shared.clone(), name: "Bob".to_string() },
            Participant { id: ParticipantId::from("y"), name: "Carol".to_string() },
        ];

        let mut donor = Session::new();
        let item = donor.upsert_item(taxi(), None).unwrap().id().clone();
        let item = donor.item(&item).unwrap().clone();

        let session = Session::from_parts(
            participants,
            vec![item.clone(), item],
            ServiceChargeRate::new(0.0),
        );

        let names: Vec<&str> = session.participants().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Carol"]);
        assert_eq!(session.items().len(), 1);
    }

    #[test]
    fn test_reset() {
        let (mut session, _) = session_with(&["Alice", "Bob"]);
        session.upsert_item(taxi(), None).unwrap();
        session.set_service_charge_rate(15.0).unwrap();

        session.reset();

        assert!(session.is_empty());
        assert_eq!(session.service_charge_rate().percent(), 10.0);
    }
}
