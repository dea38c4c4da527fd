// crates/lockup-cli/src/commands/mod.rs
//
// Command module declarations for the lockup CLI, and the ledger handle
// every command runs against.

pub mod admin;
pub mod lifecycle;
pub mod query;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lockup_core::{Clock, LedgerView, TimeIndex};
use lockup_economics::{Collaborators, ConfiguredPolicy, LedgerEvent, LockupEngine, ManualClock, StaticRegistry};
use lockup_store::{RocksStore, RocksToken};

use crate::config::LockupConfig;
use crate::error::CliError;
use crate::output::{emit, FieldRow, OutputFormat};

/// The opened ledger: engine, token book, and the clock it reads.
pub struct Ledger {
    pub engine: LockupEngine<Arc<RocksStore>>,
    pub token: Arc<RocksToken>,
    pub clock: Arc<ManualClock>,
}

impl Ledger {
    /// Block the clock currently reads.
    pub fn clock_block(&self) -> TimeIndex {
        self.clock.now()
    }
}

/// Open the ledger database and wire the collaborators from `config`.
///
/// The clock reads `block` when given, otherwise the last committed
/// emission block (or the genesis block on a fresh ledger).
pub fn open(config: &LockupConfig, block: Option<TimeIndex>) -> Result<Ledger, CliError> {
    let path = config.ledger_path();
    if let Some(parent) = Path::new(&path).parent() {
        fs::create_dir_all(parent)?;
    }
    let store = Arc::new(RocksStore::open(&path)?);
    let token = Arc::new(RocksToken::new(store.clone(), config.token.max_supply));
    let policy = ConfiguredPolicy::new(
        config.policy.max_emission_rate,
        config.policy.lockup_duration,
        config.policy.holder_share_bps,
    )?;

    let now = match block {
        Some(block) => block,
        None => store
            .emission()?
            .last_emission_block
            .unwrap_or(config.genesis_block),
    };
    let clock = Arc::new(ManualClock::new(now));
    let registry = StaticRegistry::new(config.registered_pools.iter().copied());
    tracing::debug!(path = %path, block = now, pools = registry.pool_count(), "Opened ledger");

    let collaborators = Collaborators {
        registry: Arc::new(registry),
        policy: Arc::new(policy),
        token: token.clone(),
        clock: clock.clone(),
    };
    Ok(Ledger {
        engine: LockupEngine::new(store, collaborators, config.genesis_block),
        token,
        clock,
    })
}

/// Print a committed event.
pub fn print_event(format: OutputFormat, event: &LedgerEvent) {
    let rows = vec![FieldRow::new("event", event.name()), FieldRow::new("detail", event)];
    emit(format, &rows, event);
}
