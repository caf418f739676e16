//! Item commands

use clap::{Args, Subcommand};
use std::io::Write;
use tracing::debug;

use hissa_core::{Allocation, DistributionPolicy, ItemDraft, Session};

use super::{resolve_item, resolve_participant};
use crate::error::CliResult;
use crate::output;
use crate::state::AppState;

/// Item subcommands
#[derive(Debug, Subcommand)]
pub enum ItemCommands {
    /// Add an item
    Add {
        /// Item name
        #[arg(short, long)]
        name: String,

        /// Price of one unit
        #[arg(short, long, allow_hyphen_values = true)]
        price: String,

        /// Number of units
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,

        /// How the cost is divided (all, selected, units)
        #[arg(long, default_value = "all")]
        policy: DistributionPolicy,

        #[command(flatten)]
        allocation: AllocationArgs,
    },

    /// Edit an item in place
    ///
    /// Unset flags keep their values. Any --assign or --select replaces the
    /// whole allocation.
    Edit {
        /// Item id or name
        item: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        price: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        quantity: Option<String>,

        #[arg(long)]
        policy: Option<DistributionPolicy>,

        #[command(flatten)]
        allocation: AllocationArgs,
    },

    /// Remove an item
    #[command(alias = "rm")]
    Remove {
        /// Item id or name
        item: String,
    },

    /// List items
    #[command(alias = "ls")]
    List,
}

/// Who takes part in an item.
#[derive(Debug, Clone, Default, Args)]
pub struct AllocationArgs {
    /// Units for a participant, e.g. `--assign alice=3` (units policy)
    #[arg(long = "assign", value_name = "PARTICIPANT=VALUE", value_parser = parse_assignment)]
    pub assign: Vec<(String, f64)>,

    /// Include a participant (selected policy)
    #[arg(long = "select", value_name = "PARTICIPANT")]
    pub select: Vec<String>,
}

impl AllocationArgs {
    pub fn is_empty(&self) -> bool {
        self.assign.is_empty() && self.select.is_empty()
    }

    /// Resolves participant references into an allocation.
    fn resolve(&self, session: &Session) -> CliResult<Allocation> {
        let mut allocation = Allocation::new();

        for reference in &self.select {
            allocation.set(resolve_participant(session, reference)?, 1.0);
        }
        for (reference, value) in &self.assign {
            allocation.set(resolve_participant(session, reference)?, *value);
        }

        Ok(allocation)
    }
}

/// Parses `PARTICIPANT=VALUE`.
fn parse_assignment(text: &str) -> Result<(String, f64), String> {
    let (participant, value) = text
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PARTICIPANT=VALUE, got '{}'", text))?;

    let participant = participant.trim();
    if participant.is_empty() {
        return Err("participant is missing".to_string());
    }

    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;

    Ok((participant.to_string(), value))
}

/// Execute an item command
pub async fn execute(
    command: ItemCommands,
    state: &mut AppState,
    out: &mut impl Write,
) -> CliResult<()> {
    match command {
        ItemCommands::Add {
            name,
            price,
            quantity,
            policy,
            allocation,
        } => {
            debug!(name = %name, policy = %policy, "item add");

            let mut draft = ItemDraft::new(name, price, quantity, policy);
            draft.allocation = allocation.resolve(state.session())?;

            let upsert = state.commit(out, |s| s.upsert_item(draft, None)).await?;
            writeln!(out, "Added item {}", upsert.id())?;
        }

        ItemCommands::Edit {
            item,
            name,
            price,
            quantity,
            policy,
            allocation,
        } => {
            let id = resolve_item(state.session(), &item)?;
            debug!(id = %id, "item edit");

            let mut draft = state.session().draft_from_item(&id)?;
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(price) = price {
                draft.unit_price = price;
            }
            if let Some(quantity) = quantity {
                draft.quantity = quantity;
            }
            if let Some(policy) = policy {
                draft.policy = policy;
            }
            if !allocation.is_empty() {
                draft.allocation = allocation.resolve(state.session())?;
            }

            let upsert = state
                .commit(out, |s| s.upsert_item(draft, Some(&id)))
                .await?;
            writeln!(out, "Updated item {}", upsert.id())?;
        }

        ItemCommands::Remove { item } => {
            let id = resolve_item(state.session(), &item)?;
            debug!(id = %id, "item remove");

            let removed = state.commit(out, |s| s.remove_item(&id)).await?;
            writeln!(out, "Removed item {}", removed.name)?;
        }

        ItemCommands::List => {
            output::write_items(out, state.session(), &state.config().receipt.currency)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("alice=3").unwrap(),
            ("alice".to_string(), 3.0)
        );
        assert_eq!(
            parse_assignment(" Bob = 0.5 ").unwrap(),
            ("Bob".to_string(), 0.5)
        );
        assert!(parse_assignment("alice").is_err());
        assert!(parse_assignment("=3").is_err());
        assert!(parse_assignment("alice=three").is_err());
    }
}
