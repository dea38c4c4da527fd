// crates/lockup-economics/src/migration.rs
//
// Import of state accrued under the superseded price-per-unit model.
//
// A legacy pool carries its total staked value and its interest price per
// unit; it has no `last_block` until its first post-migration stake change,
// so the accumulator reads it from the genesis block with the legacy total
// as its unit. Legacy positions carry the price they last settled at and no
// checkpoint block. Both imports are only possible before cumulative
// accounting has touched the records involved, and the positions imported
// into a pool never add up to more than its legacy total.

use lockup_core::error::LockupError;
use lockup_core::{Address, Amount, Decimal, LedgerStore, LedgerView, PoolKey};
use lockup_store::StagedLedger;

use crate::engine::LockupEngine;
use crate::events::LedgerEvent;

impl<S: LedgerStore> LockupEngine<S> {
    /// Record a pre-migration pool and fold its total into the aggregate.
    pub fn import_legacy_pool(
        &self,
        pool: &Address,
        total_value: Amount,
        interest_price: Decimal,
    ) -> Result<LedgerEvent, LockupError> {
        if !self.collaborators.registry.is_registered_pool(pool) {
            return Err(LockupError::InvalidArgument(format!("pool {} is not registered", pool)));
        }

        let _writer = self.writer()?;
        let mut tx = StagedLedger::new(&self.store);
        let mut all = tx.pool(&PoolKey::All)?;
        if !all.is_pre_migration() {
            return Err(LockupError::IllegalState(
                "cumulative accounting has started; legacy pools can no longer be imported".to_string(),
            ));
        }
        let mut entry = tx.pool(&PoolKey::Pool(*pool))?;
        if !entry.is_pre_migration() || entry.legacy_total_value != 0 {
            return Err(LockupError::IllegalState(format!("pool {} already has ledger state", pool)));
        }

        entry.legacy_total_value = total_value;
        entry.legacy_interest_price = interest_price;
        all.legacy_total_value = all
            .legacy_total_value
            .checked_add(total_value)
            .ok_or_else(|| LockupError::overflow("legacy total value"))?;
        tx.put_pool(PoolKey::Pool(*pool), entry);
        tx.put_pool(PoolKey::All, all);

        self.commit(
            tx,
            LedgerEvent::LegacyPoolImported {
                pool: *pool,
                total_value,
                interest_price,
            },
        )
    }

    /// Record a pre-migration position in a legacy pool.
    pub fn import_legacy_position(
        &self,
        pool: &Address,
        staker: &Address,
        amount: Amount,
        last_interest_price: Decimal,
    ) -> Result<LedgerEvent, LockupError> {
        if amount == 0 {
            return Err(LockupError::InvalidArgument(
                "legacy position amount must be greater than zero".to_string(),
            ));
        }

        let _writer = self.writer()?;
        let mut tx = StagedLedger::new(&self.store);
        let mut entry = tx.pool(&PoolKey::Pool(*pool))?;
        if !entry.is_pre_migration() || entry.legacy_total_value == 0 {
            return Err(LockupError::IllegalState(format!(
                "pool {} is not an imported legacy pool awaiting migration",
                pool
            )));
        }
        let mut position = tx.position(pool, staker)?;
        if position.amount != 0 || position.checkpoint_block.is_some() {
            return Err(LockupError::IllegalState(format!(
                "position of {} in {} already has ledger state",
                staker, pool
            )));
        }

        let imported = entry
            .legacy_imported_value
            .checked_add(amount)
            .filter(|imported| *imported <= entry.legacy_total_value)
            .ok_or_else(|| {
                LockupError::InvalidArgument(format!(
                    "legacy position of {} exceeds the unimported remainder {} of pool {}",
                    amount,
                    entry.legacy_total_value.saturating_sub(entry.legacy_imported_value),
                    pool
                ))
            })?;
        entry.legacy_imported_value = imported;

        position.amount = amount;
        position.last_interest_price = last_interest_price;
        tx.put_position(*pool, *staker, position);
        tx.put_pool(PoolKey::Pool(*pool), entry);

        self.commit(
            tx,
            LedgerEvent::LegacyPositionImported {
                pool: *pool,
                staker: *staker,
                amount,
                last_interest_price,
            },
        )
    }
}
