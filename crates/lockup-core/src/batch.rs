// crates/lockup-core/src/batch.rs
//
// A set of record writes applied to a `LedgerStore` as one atomic unit.

use std::collections::BTreeMap;

use crate::records::{GlobalEmissionState, PoolAccumulatorEntry, StakePosition};
use crate::types::{Address, PoolKey};

/// Record writes staged by one ledger operation.
///
/// Later writes to the same key replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerBatch {
    pub emission: Option<GlobalEmissionState>,
    pub pools: BTreeMap<PoolKey, PoolAccumulatorEntry>,
    /// Keyed by `(pool, staker)`.
    pub positions: BTreeMap<(Address, Address), StakePosition>,
}

impl LedgerBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_emission(&mut self, state: GlobalEmissionState) {
        self.emission = Some(state);
    }

    pub fn put_pool(&mut self, key: PoolKey, entry: PoolAccumulatorEntry) {
        self.pools.insert(key, entry);
    }

    pub fn put_position(&mut self, pool: Address, staker: Address, position: StakePosition) {
        self.positions.insert((pool, staker), position);
    }

    /// Number of records written.
    pub fn len(&self) -> usize {
        usize::from(self.emission.is_some()) + self.pools.len() + self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
