// crates/lockup-store/src/memory.rs
//
// In-memory ledger store.
//
// Holds every record in HashMaps behind a single RwLock so a batch lands
// under one write guard. Sufficient for tests, simulations, and embedding the
// engine in a host that persists state elsewhere.

use std::collections::HashMap;
use std::sync::RwLock;

use lockup_core::error::LockupError;
use lockup_core::{
    Address, GlobalEmissionState, LedgerBatch, LedgerStore, LedgerView, PoolAccumulatorEntry,
    PoolKey, StakePosition,
};

#[derive(Debug, Default)]
struct MemoryState {
    emission: GlobalEmissionState,
    pools: HashMap<PoolKey, PoolAccumulatorEntry>,
    positions: HashMap<(Address, Address), StakePosition>,
}

/// In-memory `LedgerStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>, LockupError> {
        self.state
            .read()
            .map_err(|_| LockupError::Storage("memory store lock poisoned".to_string()))
    }
}

impl LedgerView for MemoryStore {
    fn emission(&self) -> Result<GlobalEmissionState, LockupError> {
        Ok(self.read()?.emission)
    }

    fn pool(&self, key: &PoolKey) -> Result<PoolAccumulatorEntry, LockupError> {
        Ok(self.read()?.pools.get(key).copied().unwrap_or_default())
    }

    fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError> {
        Ok(self
            .read()?
            .positions
            .get(&(*pool, *staker))
            .copied()
            .unwrap_or_default())
    }
}

impl LedgerStore for MemoryStore {
    fn apply(&self, batch: LedgerBatch) -> Result<(), LockupError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| LockupError::Storage("memory store lock poisoned".to_string()))?;
        if let Some(emission) = batch.emission {
            state.emission = emission;
        }
        state.pools.extend(batch.pools);
        state.positions.extend(batch.positions);
        Ok(())
    }
}
