//! # hissa: split a shared bill from the command line
//!
//! ## Module Organization
//! ```text
//! hissa_cli/
//! ├── lib.rs          ← Cli definition, dispatch, logging setup (THIS FILE)
//! ├── config.rs       ← HissaConfig (TOML + environment)
//! ├── error.rs        ← CliError with machine-readable codes
//! ├── export.rs       ← share → clipboard fallback
//! ├── output.rs       ← terminal rendering
//! ├── state.rs        ← AppState: session, store, exporter
//! └── commands/
//!     ├── participant.rs
//!     ├── item.rs
//!     ├── service.rs
//!     ├── receipt.rs  ← bill, receipt, share
//!     └── session.rs  ← reset
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize tracing (stderr)                                         │
//! │  3. Load HissaConfig                                                    │
//! │  4. Open database, load the stored session, unlock writes               │
//! │  5. Run the command                                                     │
//! │  6. Close the pool                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod state;

use commands::{item, participant, receipt, service, session};
use config::HissaConfig;
use error::CliResult;
use state::AppState;

/// Hissa command line
#[derive(Debug, Parser)]
#[command(name = "hissa")]
#[command(about = "Hissa - split a shared bill fairly", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, env = "HISSA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session database path
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage participants
    #[command(alias = "p")]
    Participant {
        #[command(subcommand)]
        command: participant::ParticipantCommands,
    },

    /// Manage items
    #[command(alias = "i")]
    Item {
        #[command(subcommand)]
        command: item::ItemCommands,
    },

    /// Service charge
    Service {
        #[command(subcommand)]
        command: service::ServiceCommands,
    },

    /// Show what everyone owes
    Bill,

    /// Print the receipt
    Receipt,

    /// Share the receipt, or copy it to the clipboard
    Share,

    /// Start over with an empty session
    Reset {
        /// Confirm deleting the stored session
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `debug` when verbose, else
/// `info,hissa=debug,sqlx=warn`. Logs go to stderr.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        "info,hissa=debug,sqlx=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

/// Loads configuration, opens the session and runs one command.
pub async fn run(cli: Cli, out: &mut impl Write) -> CliResult<()> {
    let config = HissaConfig::load(cli.config.as_deref())?;

    let mut state = AppState::open(config, cli.db).await?;
    info!(
        participants = state.session().participants().len(),
        items = state.session().items().len(),
        "Session ready"
    );

    let result = execute(cli.command, &mut state, out).await;
    state.close().await;
    result
}

/// Runs one command against an open state.
pub async fn execute(
    command: Commands,
    state: &mut AppState,
    out: &mut impl Write,
) -> CliResult<()> {
    match command {
        Commands::Participant { command } => participant::execute(command, state, out).await,
        Commands::Item { command } => item::execute(command, state, out).await,
        Commands::Service { command } => service::execute(command, state, out).await,
        Commands::Bill => receipt::bill(state, out),
        Commands::Receipt => receipt::receipt(state, out),
        Commands::Share => receipt::share(state, out).await,
        Commands::Reset { yes } => session::reset(state, yes, out).await,
    }
}
