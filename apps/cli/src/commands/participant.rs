//! Participant commands

use clap::Subcommand;
use std::io::Write;
use tracing::debug;

use super::resolve_participant;
use crate::error::CliResult;
use crate::output;
use crate::state::AppState;

/// Participant subcommands
#[derive(Debug, Subcommand)]
pub enum ParticipantCommands {
    /// Add a participant
    Add {
        /// Display name
        name: String,
    },

    /// Remove a participant (their allocations stay on the items)
    #[command(alias = "rm")]
    Remove {
        /// Participant id or name
        participant: String,
    },

    /// List participants
    #[command(alias = "ls")]
    List,
}

/// Execute a participant command
pub async fn execute(
    command: ParticipantCommands,
    state: &mut AppState,
    out: &mut impl Write,
) -> CliResult<()> {
    match command {
        ParticipantCommands::Add { name } => {
            debug!(name = %name, "participant add");
            let added = state
                .commit(out, |s| s.add_participant(&name).cloned())
                .await?;
            writeln!(out, "Added {} ({})", added.name, added.id)?;
        }

        ParticipantCommands::Remove { participant } => {
            let id = resolve_participant(state.session(), &participant)?;
            debug!(id = %id, "participant remove");
            let removed = state.commit(out, |s| s.remove_participant(&id)).await?;
            writeln!(out, "Removed {}", removed.name)?;
        }

        ParticipantCommands::List => {
            output::write_participants(out, state.session())?;
        }
    }

    Ok(())
}
