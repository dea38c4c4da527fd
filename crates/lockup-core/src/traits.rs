// crates/lockup-core/src/traits.rs

use std::sync::Arc;

use crate::batch::LedgerBatch;
use crate::error::LockupError;
use crate::records::{GlobalEmissionState, PoolAccumulatorEntry, StakePosition};
use crate::types::{Address, Amount, PoolKey, TimeIndex};

/// Read access to ledger records.
///
/// Missing keys return the record's zero value.
pub trait LedgerView {
    fn emission(&self) -> Result<GlobalEmissionState, LockupError>;

    fn pool(&self, key: &PoolKey) -> Result<PoolAccumulatorEntry, LockupError>;

    fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError>;
}

/// Persistent ledger storage.
///
/// Implemented by lockup-store (in-memory and RocksDB backends).
pub trait LedgerStore: LedgerView + Send + Sync {
    /// Apply every write in `batch`, or none of them.
    fn apply(&self, batch: LedgerBatch) -> Result<(), LockupError>;
}

impl<T: LedgerView + ?Sized> LedgerView for Arc<T> {
    fn emission(&self) -> Result<GlobalEmissionState, LockupError> {
        (**self).emission()
    }

    fn pool(&self, key: &PoolKey) -> Result<PoolAccumulatorEntry, LockupError> {
        (**self).pool(key)
    }

    fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError> {
        (**self).position(pool, staker)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn apply(&self, batch: LedgerBatch) -> Result<(), LockupError> {
        (**self).apply(batch)
    }
}

/// Asset registry: answers whether an address is a stakeable pool.
pub trait PoolRegistry: Send + Sync {
    fn is_registered_pool(&self, pool: &Address) -> bool;
}

/// Emission policy: mint rate, lockup length, and holder/staker split.
pub trait EmissionPolicy: Send + Sync {
    /// Maximum mint per block across the whole protocol.
    fn max_emission_rate(&self) -> Result<Amount, LockupError>;

    /// Blocks between cancellation and permitted release.
    fn lockup_duration(&self) -> Result<TimeIndex, LockupError>;

    /// Portion of `pool_reward` owed to the pool's holders, given the amount staked in it.
    fn split_holder_share(&self, pool_reward: Amount, staked_in_pool: Amount) -> Result<Amount, LockupError>;
}

/// Mintable fungible token.
pub trait FungibleToken: Send + Sync {
    fn mint(&self, to: &Address, amount: Amount) -> Result<(), LockupError>;

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), LockupError>;

    /// Destroy `amount` held by `from`. Used to take back a mint whose
    /// ledger write failed.
    fn burn(&self, from: &Address, amount: Amount) -> Result<(), LockupError>;

    fn balance_of(&self, owner: &Address) -> Result<Amount, LockupError>;
}

/// Host-supplied monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> TimeIndex;
}
