//! # Receipt Export
//!
//! Hands receipt text to an external program on stdin.
//!
//! ## Fallback Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   share_command configured? ──no──┐                                    │
//! │        │ yes                      │                                    │
//! │        ▼                          ▼                                    │
//! │   run share ──ok──► Shared    run clipboard ──ok──► CopiedToClipboard  │
//! │        │                          │                                    │
//! │        └──failed─────────────────►│──failed──► Failed { reason }       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Export never touches the session and never panics. Every outcome,
//! including failure, comes back as a value the caller shows to the user.

use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;

/// Result of handing a receipt to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The share program accepted the text.
    Shared,

    /// Sharing was unavailable or failed; the text is on the clipboard.
    CopiedToClipboard,

    /// Neither route worked.
    Failed { reason: String },
}

impl ExportOutcome {
    /// One line for the user.
    pub fn acknowledgement(&self) -> String {
        match self {
            ExportOutcome::Shared => "Receipt shared.".to_string(),
            ExportOutcome::CopiedToClipboard => "Receipt copied to clipboard.".to_string(),
            ExportOutcome::Failed { reason } => format!("Could not export receipt: {}", reason),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ExportOutcome::Failed { .. })
    }
}

/// Share-then-clipboard exporter.
#[derive(Debug, Clone)]
pub struct ReceiptExporter {
    share: Option<Vec<String>>,
    clipboard: Vec<String>,
}

impl ReceiptExporter {
    pub fn new(share: Option<Vec<String>>, clipboard: Vec<String>) -> Self {
        ReceiptExporter { share, clipboard }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        ReceiptExporter::new(
            config.share_command.clone(),
            config.clipboard_command.clone(),
        )
    }

    /// Shares the text, falling back to the clipboard.
    pub async fn export(&self, text: &str) -> ExportOutcome {
        if let Some(share) = &self.share {
            match pipe_to(share, text).await {
                Ok(()) => {
                    info!("Receipt shared");
                    return ExportOutcome::Shared;
                }
                Err(reason) => warn!(reason = %reason, "Share failed, falling back to clipboard"),
            }
        } else {
            debug!("No share command configured");
        }

        match pipe_to(&self.clipboard, text).await {
            Ok(()) => {
                info!("Receipt copied to clipboard");
                ExportOutcome::CopiedToClipboard
            }
            Err(reason) => {
                warn!(reason = %reason, "Clipboard copy failed");
                ExportOutcome::Failed { reason }
            }
        }
    }
}

/// Runs `command` with `text` on stdin and waits for a zero exit.
async fn pipe_to(command: &[String], text: &str) -> Result<(), String> {
    let Some((program, args)) = command.split_first() else {
        return Err("no program configured".to_string());
    };

    debug!(program = %program, "Spawning export program");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{}: {}", program, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| format!("{}: {}", program, e))?;
        // Closing stdin lets the program see end of input.
        drop(stdin);
    }

    let status = child
        .wait()
        .await
        .map_err(|e| format!("{}: {}", program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", program, status))
    }
}
