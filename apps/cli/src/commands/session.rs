//! Session reset

use std::io::Write;
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::state::AppState;

/// Clear participants, items and the stored session.
///
/// ## Errors
/// `VALIDATION_ERROR` unless `confirmed` (`--yes`).
pub async fn reset(state: &mut AppState, confirmed: bool, out: &mut impl Write) -> CliResult<()> {
    if !confirmed {
        return Err(CliError::validation(
            "reset deletes every participant and item; pass --yes to confirm",
        ));
    }

    state.reset().await?;
    info!("Session reset");

    writeln!(
        out,
        "Session cleared. Service charge: {}%",
        state.session().service_charge_rate()
    )?;
    Ok(())
}
