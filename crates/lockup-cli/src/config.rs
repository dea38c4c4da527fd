// crates/lockup-cli/src/config.rs
//
// Runtime configuration for the lockup CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use lockup_core::{Address, Amount, TimeIndex};
use lockup_economics::{DEFAULT_HOLDER_SHARE_BPS, DEFAULT_LOCKUP_DURATION, DEFAULT_MAX_EMISSION_RATE};

use crate::error::CliError;

/// Runtime configuration for the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct LockupConfig {
    /// Directory holding the ledger database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Block that pre-migration pools and positions are measured from.
    #[serde(default)]
    pub genesis_block: TimeIndex,

    /// Pools that accept stake (hex addresses).
    #[serde(default)]
    pub registered_pools: Vec<Address>,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub token: TokenConfig,
}

/// Emission policy parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Maximum mint per block across all pools, in base units.
    #[serde(default = "default_max_emission_rate")]
    pub max_emission_rate: Amount,

    /// Blocks between cancellation and permitted release.
    #[serde(default = "default_lockup_duration")]
    pub lockup_duration: TimeIndex,

    /// Holder share of each pool reward, in basis points.
    #[serde(default = "default_holder_share_bps")]
    pub holder_share_bps: u32,
}

/// Token book parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenConfig {
    /// Cap on total minted supply. Unset means uncapped.
    #[serde(default)]
    pub max_supply: Option<Amount>,
}

fn default_data_dir() -> String {
    "~/.lockup/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_emission_rate() -> Amount {
    DEFAULT_MAX_EMISSION_RATE
}

fn default_lockup_duration() -> TimeIndex {
    DEFAULT_LOCKUP_DURATION
}

fn default_holder_share_bps() -> u32 {
    DEFAULT_HOLDER_SHARE_BPS
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_emission_rate: default_max_emission_rate(),
            lockup_duration: default_lockup_duration(),
            holder_share_bps: default_holder_share_bps(),
        }
    }
}

impl Default for LockupConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            genesis_block: 0,
            registered_pools: Vec::new(),
            policy: PolicyConfig::default(),
            token: TokenConfig::default(),
        }
    }
}

impl LockupConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, CliError> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, CliError> {
        let config: LockupConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Path of the ledger database, with `~` expanded.
    pub fn ledger_path(&self) -> String {
        format!("{}/ledger", expand_tilde(&self.data_dir).trim_end_matches('/'))
    }
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
