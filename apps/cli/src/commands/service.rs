//! Service charge commands

use clap::Subcommand;
use std::io::Write;
use tracing::debug;

use hissa_core::validation::parse_service_charge_rate;

use crate::error::CliResult;
use crate::state::AppState;

/// Service charge subcommands
#[derive(Debug, Subcommand)]
pub enum ServiceCommands {
    /// Set the service charge percentage (zero and negative are allowed)
    Set {
        /// Percentage, e.g. 12.5
        #[arg(allow_hyphen_values = true)]
        rate: String,
    },

    /// Show the current service charge
    Show,
}

/// Execute a service charge command
pub async fn execute(
    command: ServiceCommands,
    state: &mut AppState,
    out: &mut impl Write,
) -> CliResult<()> {
    match command {
        ServiceCommands::Set { rate } => {
            debug!(rate = %rate, "service set");
            let percent = parse_service_charge_rate(&rate)?;
            state
                .commit(out, |s| s.set_service_charge_rate(percent))
                .await?;
        }

        ServiceCommands::Show => {
            writeln!(out, "Service charge: {}%", state.session().service_charge_rate())?;
        }
    }

    Ok(())
}
