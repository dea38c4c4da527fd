// crates/lockup-economics/src/accumulator.rs
//
// Cumulative stake area per pool and for the protocol-wide aggregate.
//
// The area is the integral of "amount staked" over blocks. Each entry stores
// its area as of `last_block` together with the unit staked since then, so
// the area at any later block is one multiply-add. Every stake change updates
// the pool entry and the `PoolKey::All` entry together, which keeps the
// aggregate unit equal to the sum of per-pool units.
//
// Pools that predate cumulative accounting have no `last_block`. They read as
// zero area accumulated since the genesis block with the legacy total staked
// as the unit, until their first post-migration stake change.

use lockup_core::error::LockupError;
use lockup_core::{Address, Amount, LedgerView, PoolAccumulatorEntry, PoolKey, TimeIndex};
use lockup_store::StagedLedger;

use crate::context::AccrualContext;

/// Cumulative stake area evaluated at a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeArea {
    /// Area up to the evaluation block.
    pub area: Amount,
    /// Amount currently staked.
    pub unit: Amount,
    /// Block of the last recorded stake change (or the genesis block).
    pub last_block: TimeIndex,
}

/// Signed change to a pool's staked amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeDelta {
    Increase(Amount),
    Decrease(Amount),
}

fn recorded(entry: &PoolAccumulatorEntry, genesis_block: TimeIndex) -> StakeArea {
    match entry.last_block {
        Some(last_block) => StakeArea {
            area: entry.cumulative_stake_area,
            unit: entry.current_stake_unit,
            last_block,
        },
        None => StakeArea {
            area: 0,
            unit: entry.legacy_total_value,
            last_block: genesis_block,
        },
    }
}

/// Evaluate the cumulative stake area of `key` at `ctx.now`. Read-only.
pub fn cumulative_stake_area(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    key: &PoolKey,
) -> Result<StakeArea, LockupError> {
    let entry = view.pool(key)?;
    let stored = recorded(&entry, ctx.genesis_block);
    let elapsed = ctx.now.saturating_sub(stored.last_block);
    let growth = stored
        .unit
        .checked_mul(Amount::from(elapsed))
        .ok_or_else(|| LockupError::overflow("stake area growth"))?;
    let area = stored
        .area
        .checked_add(growth)
        .ok_or_else(|| LockupError::overflow("cumulative stake area"))?;
    Ok(StakeArea {
        area,
        unit: stored.unit,
        last_block: stored.last_block,
    })
}

/// Apply a stake change to `pool` and to the aggregate at `ctx.now`.
///
/// Folds the area accrued since `last_block` into the stored area, then
/// records the new unit and moves `last_block` to `ctx.now`.
pub fn update_stake(
    tx: &mut StagedLedger<'_>,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    delta: StakeDelta,
) -> Result<(), LockupError> {
    for key in [PoolKey::Pool(*pool), PoolKey::All] {
        let current = cumulative_stake_area(&*tx, ctx, &key)?;
        let unit = match delta {
            StakeDelta::Increase(amount) => current
                .unit
                .checked_add(amount)
                .ok_or_else(|| LockupError::overflow("staked amount"))?,
            StakeDelta::Decrease(amount) => current.unit.checked_sub(amount).ok_or_else(|| {
                LockupError::IllegalState(format!(
                    "cannot remove {} from {} which holds {}",
                    amount, key, current.unit
                ))
            })?,
        };
        let mut entry = tx.pool(&key)?;
        entry.cumulative_stake_area = current.area;
        entry.current_stake_unit = unit;
        entry.last_block = Some(ctx.now);
        tx.put_pool(key, entry);
    }
    Ok(())
}
