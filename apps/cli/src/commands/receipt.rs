//! Bill, receipt and share commands
//!
//! Read-only: none of these touch the stored session.

use std::io::Write;

use crate::error::{CliError, CliResult};
use crate::output;
use crate::state::AppState;

/// Print the per-participant summary.
pub fn bill(state: &AppState, out: &mut impl Write) -> CliResult<()> {
    output::write_bill(
        out,
        &state.bill(),
        state.session(),
        &state.config().receipt.currency,
    )?;
    Ok(())
}

/// Print the receipt text.
pub fn receipt(state: &AppState, out: &mut impl Write) -> CliResult<()> {
    writeln!(out, "{}", state.receipt())?;
    Ok(())
}

/// Share the receipt, falling back to the clipboard.
///
/// ## Errors
/// `EXPORT_ERROR` when both routes fail.
pub async fn share(state: &AppState, out: &mut impl Write) -> CliResult<()> {
    let outcome = state.share().await;

    if outcome.is_success() {
        writeln!(out, "{}", outcome.acknowledgement())?;
        Ok(())
    } else {
        Err(CliError::export(outcome.acknowledgement()))
    }
}
