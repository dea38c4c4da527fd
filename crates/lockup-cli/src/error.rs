// crates/lockup-cli/src/error.rs

use lockup_core::LockupError;
use thiserror::Error;

/// Errors surfaced by the lockup CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// The ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LockupError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl CliError {
    /// Stable code for the error category, as printed on failure.
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Ledger(e) => e.code(),
            CliError::Io(_) => "io",
            CliError::Config(_) => "config",
        }
    }
}
