// crates/lockup-store/src/staged.rs
//
// Staged write overlay for a single ledger operation.
//
// Reads see this operation's own writes first and fall through to the base
// view otherwise. Nothing reaches the store until the caller hands
// `into_batch()` to `LedgerStore::apply`, so an operation that fails
// half-way leaves no trace.

use lockup_core::error::LockupError;
use lockup_core::{
    Address, GlobalEmissionState, LedgerBatch, LedgerView, PoolAccumulatorEntry, PoolKey,
    StakePosition,
};

/// Read-through, write-buffering view over a `LedgerView`.
pub struct StagedLedger<'a> {
    base: &'a dyn LedgerView,
    batch: LedgerBatch,
}

impl<'a> StagedLedger<'a> {
    /// Start staging on top of `base`.
    pub fn new(base: &'a dyn LedgerView) -> Self {
        Self {
            base,
            batch: LedgerBatch::new(),
        }
    }

    pub fn put_emission(&mut self, state: GlobalEmissionState) {
        self.batch.put_emission(state);
    }

    pub fn put_pool(&mut self, key: PoolKey, entry: PoolAccumulatorEntry) {
        self.batch.put_pool(key, entry);
    }

    pub fn put_position(&mut self, pool: Address, staker: Address, position: StakePosition) {
        self.batch.put_position(pool, staker, position);
    }

    /// Finish staging and hand back the writes.
    pub fn into_batch(self) -> LedgerBatch {
        self.batch
    }
}

impl LedgerView for StagedLedger<'_> {
    fn emission(&self) -> Result<GlobalEmissionState, LockupError> {
        match self.batch.emission {
            Some(state) => Ok(state),
            None => self.base.emission(),
        }
    }

    fn pool(&self, key: &PoolKey) -> Result<PoolAccumulatorEntry, LockupError> {
        match self.batch.pools.get(key) {
            Some(entry) => Ok(*entry),
            None => self.base.pool(key),
        }
    }

    fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError> {
        match self.batch.positions.get(&(*pool, *staker)) {
            Some(position) => Ok(*position),
            None => self.base.position(pool, staker),
        }
    }
}
