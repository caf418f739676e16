//! CLI command implementations
//!
//! Participants and items can be referred to by id or by name. A name must
//! match exactly one entry (case-insensitive).

pub mod item;
pub mod participant;
pub mod receipt;
pub mod service;
pub mod session;

use hissa_core::{ItemId, ParticipantId, Session};

use crate::error::{CliError, CliResult};

/// Resolves a participant id or unique name.
pub fn resolve_participant(session: &Session, reference: &str) -> CliResult<ParticipantId> {
    let reference = reference.trim();

    if let Some(p) = session
        .participants()
        .iter()
        .find(|p| p.id.as_str() == reference)
    {
        return Ok(p.id.clone());
    }

    let matches: Vec<&ParticipantId> = session
        .participants()
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(reference))
        .map(|p| &p.id)
        .collect();

    unique(matches, "Participant", reference)
}

/// Resolves an item id or unique name.
pub fn resolve_item(session: &Session, reference: &str) -> CliResult<ItemId> {
    let reference = reference.trim();

    if let Some(item) = session.items().iter().find(|i| i.id.as_str() == reference) {
        return Ok(item.id.clone());
    }

    let matches: Vec<&ItemId> = session
        .items()
        .iter()
        .filter(|i| i.name.eq_ignore_ascii_case(reference))
        .map(|i| &i.id)
        .collect();

    unique(matches, "Item", reference)
}

fn unique<T: Clone>(matches: Vec<&T>, resource: &str, reference: &str) -> CliResult<T> {
    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(CliError::not_found(resource, reference)),
        many => Err(CliError::validation(format!(
            "{} name '{}' is ambiguous ({} matches); use the id",
            resource,
            reference,
            many.len()
        ))),
    }
}
