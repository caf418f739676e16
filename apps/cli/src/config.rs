//! # Configuration
//!
//! Settings for the `hissa` command.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line flags (highest priority)                              │
//! │     --db ./dinner.db                                                   │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     HISSA_DB_PATH, HISSA_CURRENCY, HISSA_DEFAULT_SERVICE_RATE,         │
//! │     HISSA_SHARE_COMMAND, HISSA_CLIPBOARD_COMMAND                       │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/hissa/hissa.toml (Linux)                                 │
//! │     ~/Library/Application Support/app.hissa.hissa/hissa.toml (macOS)   │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! database_path = "/home/me/.local/share/hissa/hissa.db"
//!
//! [receipt]
//! title = "HISSA - Bill summary"
//! currency = "so'm"
//! include_timestamp = true
//!
//! [session]
//! default_service_rate = 10
//!
//! [export]
//! share_command = ["termux-share", "-a", "send"]
//! clipboard_command = ["xclip", "-selection", "clipboard"]
//! ```

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use hissa_core::{ReceiptStyle, ServiceChargeRate, DEFAULT_SERVICE_CHARGE_RATE};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the data directory; set HISSA_DB_PATH")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Where the session is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file. Defaults to `hissa.db` in the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// How receipts look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Print the date and time under the title.
    #[serde(default = "default_true")]
    pub include_timestamp: bool,
}

fn default_title() -> String {
    ReceiptStyle::default().title
}

fn default_currency() -> String {
    ReceiptStyle::default().currency
}

fn default_true() -> bool {
    true
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        ReceiptConfig {
            title: default_title(),
            currency: default_currency(),
            include_timestamp: true,
        }
    }
}

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Service charge for a new or reset session, in percent.
    #[serde(default = "default_service_rate")]
    pub default_service_rate: f64,
}

fn default_service_rate() -> f64 {
    DEFAULT_SERVICE_CHARGE_RATE
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            default_service_rate: default_service_rate(),
        }
    }
}

/// External programs that receive the receipt on stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Program + arguments for sharing. No share step when absent.
    #[serde(default)]
    pub share_command: Option<Vec<String>>,

    /// Program + arguments for copying to the clipboard.
    #[serde(default = "default_clipboard_command")]
    pub clipboard_command: Vec<String>,
}

fn default_clipboard_command() -> Vec<String> {
    let command: &[&str] = if cfg!(target_os = "macos") {
        &["pbcopy"]
    } else if cfg!(target_os = "windows") {
        &["clip"]
    } else {
        &["xclip", "-selection", "clipboard"]
    };
    command.iter().map(|s| s.to_string()).collect()
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            share_command: None,
            clipboard_command: default_clipboard_command(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete `hissa` configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HissaConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub receipt: ReceiptConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl HissaConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path` if given (must exist), otherwise
    ///    `hissa.toml` in the platform config directory (if present)
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.session.default_service_rate.is_finite() {
            return Err(ConfigError::Invalid(
                "default_service_rate must be a finite number".into(),
            ));
        }

        if !is_runnable(&self.export.clipboard_command) {
            return Err(ConfigError::Invalid(
                "clipboard_command must name a program".into(),
            ));
        }

        if let Some(share) = &self.export.share_command {
            if !is_runnable(share) {
                return Err(ConfigError::Invalid(
                    "share_command must name a program".into(),
                ));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("HISSA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(currency) = var("HISSA_CURRENCY") {
            self.receipt.currency = currency;
        }

        if let Some(rate) = var("HISSA_DEFAULT_SERVICE_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(r) => self.session.default_service_rate = r,
                Err(_) => warn!(rate = %rate, "Ignoring unparseable HISSA_DEFAULT_SERVICE_RATE"),
            }
        }

        if let Some(command) = var("HISSA_SHARE_COMMAND") {
            let parts = split_command(&command);
            self.export.share_command = if parts.is_empty() { None } else { Some(parts) };
        }

        if let Some(command) = var("HISSA_CLIPBOARD_COMMAND") {
            self.export.clipboard_command = split_command(&command);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("hissa.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The database file, falling back to the platform data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().join("hissa.db"))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn default_service_rate(&self) -> ServiceChargeRate {
        ServiceChargeRate::new(self.session.default_service_rate)
    }

    /// Receipt style, stamped with `now` when timestamps are enabled.
    pub fn receipt_style(&self, now: DateTime<Utc>) -> ReceiptStyle {
        ReceiptStyle {
            title: self.receipt.title.clone(),
            currency: self.receipt.currency.clone(),
            issued_at: self.receipt.include_timestamp.then_some(now),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "hissa", "hissa")
}

fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

fn is_runnable(command: &[String]) -> bool {
    command.first().is_some_and(|program| !program.trim().is_empty())
}
