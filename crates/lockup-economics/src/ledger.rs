// crates/lockup-economics/src/ledger.rs
//
// Per-staker entitlement.
//
// A staker's accrued interest is read off the pool's cumulative staker-share
// curve and apportioned by the staker's presence in the pool's stake-area
// history since their last checkpoint. Nothing here iterates over other
// stakers.
//
// Three cases:
//   SoleFirst - the staker is the whole pool and has never seen pool interest:
//               take the pool's staker share since their emission checkpoint.
//   Sole      - the staker is the whole pool: take the growth of the pool's
//               cumulative staker share since their checkpoint.
//   Shared    - apportion that growth by user area / pool area growth.

use lockup_core::error::LockupError;
use lockup_core::{Address, Amount, Decimal, LedgerView, PoolKey, StakePosition, TimeIndex};
use lockup_store::StagedLedger;
use serde::{Deserialize, Serialize};

use crate::accumulator::{cumulative_stake_area, StakeArea};
use crate::context::AccrualContext;
use crate::emission::refresh_emission;
use crate::rewards::split_since;

/// Which accrual formula applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualCase {
    /// Nothing staked, nothing accrues.
    Empty,
    SoleFirst,
    Sole,
    Shared,
}

/// Interest accrued since the last checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    pub amount: Amount,
    pub case: AccrualCase,
}

/// What a settlement credited to `pending_withdrawal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Cumulative-model accrual since the previous checkpoint.
    pub accrued: Amount,
    /// Price-per-unit accrual carried over from the legacy model.
    pub legacy: Amount,
    /// `pending_withdrawal` after the settlement.
    pub pending: Amount,
}

/// The staker's stake-area checkpoint; a never-settled position reads as
/// zero area at the genesis block.
fn checkpoint_of(position: &StakePosition, genesis_block: TimeIndex) -> (Amount, TimeIndex) {
    match position.checkpoint_block {
        Some(block) => (position.checkpoint_pool_stake_area, block),
        None => (0, genesis_block),
    }
}

fn sole_first_accrual(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    position: &StakePosition,
) -> Result<Amount, LockupError> {
    Ok(split_since(view, ctx, pool, position.checkpoint_global_reward)?.staker_share)
}

fn sole_accrual(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    position: &StakePosition,
) -> Result<Amount, LockupError> {
    let interest = split_since(view, ctx, pool, 0)?.staker_share;
    Ok(interest.saturating_sub(position.checkpoint_pool_interest))
}

fn shared_accrual(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    position: &StakePosition,
    pool_area: &StakeArea,
) -> Result<Amount, LockupError> {
    let (checkpoint_area, checkpoint_block) = checkpoint_of(position, ctx.genesis_block);
    let user_area = position
        .amount
        .checked_mul(Amount::from(ctx.now.saturating_sub(checkpoint_block)))
        .ok_or_else(|| LockupError::overflow("staker area"))?;
    let fraction = Decimal::ratio(user_area, pool_area.area.saturating_sub(checkpoint_area))?;
    let gained = split_since(view, ctx, pool, 0)?
        .staker_share
        .saturating_sub(position.checkpoint_pool_interest);
    fraction.mul_amount(gained)
}

/// Interest accrued to `staker` in `pool` since their last checkpoint. Read-only.
pub fn compute_accrued(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    staker: &Address,
) -> Result<Accrual, LockupError> {
    let position = view.position(pool, staker)?;
    if position.amount == 0 {
        return Ok(Accrual {
            amount: 0,
            case: AccrualCase::Empty,
        });
    }

    let pool_area = cumulative_stake_area(view, ctx, &PoolKey::Pool(*pool))?;
    let (_, checkpoint_block) = checkpoint_of(&position, ctx.genesis_block);
    let sole = pool_area.unit == position.amount && pool_area.last_block <= checkpoint_block;

    let (amount, case) = if sole && position.checkpoint_pool_interest == 0 {
        (sole_first_accrual(view, ctx, pool, &position)?, AccrualCase::SoleFirst)
    } else if sole {
        (sole_accrual(view, ctx, pool, &position)?, AccrualCase::Sole)
    } else {
        (
            shared_accrual(view, ctx, pool, &position, &pool_area)?,
            AccrualCase::Shared,
        )
    };
    Ok(Accrual { amount, case })
}

/// Accrual under the superseded price-per-unit model:
/// `(pool price - staker price) * amount`, floored at zero.
pub fn legacy_bridge_amount(view: &dyn LedgerView, pool: &Address, staker: &Address) -> Result<Amount, LockupError> {
    let position = view.position(pool, staker)?;
    let entry = view.pool(&PoolKey::Pool(*pool))?;
    entry
        .legacy_interest_price
        .saturating_sub(position.last_interest_price)
        .mul_amount(position.amount)
}

/// Everything `staker` could withdraw from `pool` right now. Read-only.
pub fn withdrawable_amount(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    staker: &Address,
) -> Result<Amount, LockupError> {
    let accrued = compute_accrued(view, ctx, pool, staker)?.amount;
    let legacy = legacy_bridge_amount(view, pool, staker)?;
    let position = view.position(pool, staker)?;
    position
        .pending_withdrawal
        .checked_add(accrued)
        .and_then(|v| v.checked_add(legacy))
        .ok_or_else(|| LockupError::overflow("withdrawable amount"))
}

/// Move the staker's accrual into `pending_withdrawal` and reset every
/// checkpoint to its value at `ctx.now`.
///
/// Must run before the stake amount changes. A second call at the same block
/// with nothing in between credits nothing.
pub fn settle(
    tx: &mut StagedLedger<'_>,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    staker: &Address,
) -> Result<Settlement, LockupError> {
    let accrual = compute_accrued(&*tx, ctx, pool, staker)?;
    let legacy = legacy_bridge_amount(&*tx, pool, staker)?;

    let emission = refresh_emission(&*tx, ctx)?;
    let pool_interest = split_since(&*tx, ctx, pool, 0)?.staker_share;
    let pool_area = cumulative_stake_area(&*tx, ctx, &PoolKey::Pool(*pool))?;
    let entry = tx.pool(&PoolKey::Pool(*pool))?;

    let mut position = tx.position(pool, staker)?;
    position.pending_withdrawal = position
        .pending_withdrawal
        .checked_add(accrual.amount)
        .and_then(|v| v.checked_add(legacy))
        .ok_or_else(|| LockupError::overflow("pending withdrawal"))?;
    position.checkpoint_global_reward = emission.next_cumulative;
    position.checkpoint_pool_interest = pool_interest;
    position.checkpoint_pool_stake_area = pool_area.area;
    position.checkpoint_block = Some(ctx.now);
    position.last_interest_price = entry.legacy_interest_price;

    tracing::debug!(
        pool = %pool,
        staker = %staker,
        case = ?accrual.case,
        accrued = accrual.amount,
        legacy,
        pending = position.pending_withdrawal,
        checkpoint_area = pool_area.area,
        checkpoint_interest = pool_interest,
        "Settled position"
    );

    let settlement = Settlement {
        accrued: accrual.amount,
        legacy,
        pending: position.pending_withdrawal,
    };
    tx.put_position(*pool, *staker, position);
    Ok(settlement)
}

/// Re-read the pool's cumulative staker interest into the staker's
/// checkpoint.
///
/// The holder/staker split depends on what is staked in the pool, so the
/// value `settle` recorded goes stale once the pool's unit has moved in the
/// same batch. Run after `update_stake` and the amount change.
pub fn refresh_interest_checkpoint(
    tx: &mut StagedLedger<'_>,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    staker: &Address,
) -> Result<(), LockupError> {
    let pool_interest = split_since(&*tx, ctx, pool, 0)?.staker_share;
    let mut position = tx.position(pool, staker)?;
    position.checkpoint_pool_interest = pool_interest;
    tx.put_position(*pool, *staker, position);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{update_stake, StakeDelta};
    use crate::emission::commit_emission;
    use crate::policy::ConfiguredPolicy;
    use lockup_core::{GlobalEmissionState, LedgerBatch, LedgerStore, PoolAccumulatorEntry, BASIS};
    use lockup_store::MemoryStore;

    fn policy() -> ConfiguredPolicy {
        ConfiguredPolicy::new(1_000, 10, 5_000).unwrap()
    }

    /// Stake the way the engine does: settle, move the accumulators, bump the
    /// amount, re-read the interest checkpoint, commit the emission curve.
    fn stake(store: &MemoryStore, policy: &ConfiguredPolicy, pool: &Address, staker: &Address, amount: Amount, now: TimeIndex) {
        let ctx = AccrualContext::new(policy, now, 0);
        let mut tx = StagedLedger::new(store);
        settle(&mut tx, &ctx, pool, staker).unwrap();
        update_stake(&mut tx, &ctx, pool, StakeDelta::Increase(amount)).unwrap();
        let mut position = tx.position(pool, staker).unwrap();
        position.amount += amount;
        tx.put_position(*pool, *staker, position);
        refresh_interest_checkpoint(&mut tx, &ctx, pool, staker).unwrap();
        let snapshot = refresh_emission(&tx, &ctx).unwrap();
        commit_emission(&mut tx, snapshot, now);
        let batch = tx.into_batch();
        store.apply(batch).unwrap();
    }

    fn settle_at(store: &MemoryStore, policy: &ConfiguredPolicy, pool: &Address, staker: &Address, now: TimeIndex) -> Settlement {
        let ctx = AccrualContext::new(policy, now, 0);
        let mut tx = StagedLedger::new(store);
        let settlement = settle(&mut tx, &ctx, pool, staker).unwrap();
        let batch = tx.into_batch();
        store.apply(batch).unwrap();
        settlement
    }

    fn accrued_at(store: &MemoryStore, policy: &ConfiguredPolicy, pool: &Address, staker: &Address, now: TimeIndex) -> Accrual {
        let ctx = AccrualContext::new(policy, now, 0);
        compute_accrued(store, &ctx, pool, staker).unwrap()
    }

    #[test]
    fn test_unstaked_position_accrues_nothing() {
        let store = MemoryStore::new();
        let policy = policy();
        let accrual = accrued_at(&store, &policy, &Address::repeat_byte(1), &Address::repeat_byte(9), 100);
        assert_eq!(accrual.amount, 0);
        assert_eq!(accrual.case, AccrualCase::Empty);
    }

    #[test]
    fn test_sole_staker_gets_staker_share() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        stake(&store, &policy, &pool, &alice, 100, 10);

        // 10 blocks at 1_000 per block, half to holders.
        let accrual = accrued_at(&store, &policy, &pool, &alice, 20);
        assert_eq!(accrual.case, AccrualCase::SoleFirst);
        assert_eq!(accrual.amount, 5_000);
    }

    #[test]
    fn test_settle_is_idempotent_within_a_block() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        stake(&store, &policy, &pool, &alice, 100, 10);

        let first = settle_at(&store, &policy, &pool, &alice, 20);
        assert_eq!(first.accrued, 5_000);
        assert_eq!(first.pending, 5_000);

        let second = settle_at(&store, &policy, &pool, &alice, 20);
        assert_eq!(second.accrued, 0);
        assert_eq!(second.pending, 5_000);
    }

    #[test]
    fn test_sole_staker_after_checkpoint() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        stake(&store, &policy, &pool, &alice, 100, 10);
        settle_at(&store, &policy, &pool, &alice, 20);

        let accrual = accrued_at(&store, &policy, &pool, &alice, 30);
        assert_eq!(accrual.case, AccrualCase::Sole);
        assert_eq!(accrual.amount, 5_000);

        let ctx = AccrualContext::new(&policy, 30, 0);
        assert_eq!(withdrawable_amount(&store, &ctx, &pool, &alice).unwrap(), 10_000);
    }

    #[test]
    fn test_shared_pool_splits_by_area() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb0);
        stake(&store, &policy, &pool, &alice, 300, 10);
        stake(&store, &policy, &pool, &bob, 100, 10);

        let a = accrued_at(&store, &policy, &pool, &alice, 20);
        let b = accrued_at(&store, &policy, &pool, &bob, 20);
        assert_eq!(a.case, AccrualCase::Shared);
        assert_eq!(b.case, AccrualCase::Shared);
        assert_eq!(a.amount, 3_750);
        assert_eq!(b.amount, 1_250);
    }

    fn seed_legacy(store: &MemoryStore, pool: &Address, staker: &Address) {
        let mut batch = LedgerBatch::new();
        batch.put_emission(GlobalEmissionState {
            cumulative_emission: 0,
            last_emission_rate: 1_000,
            last_emission_block: Some(0),
        });
        let legacy_pool = PoolAccumulatorEntry {
            legacy_total_value: 100,
            legacy_interest_price: Decimal::from_raw(2 * BASIS),
            ..Default::default()
        };
        batch.put_pool(PoolKey::Pool(*pool), legacy_pool);
        batch.put_pool(
            PoolKey::All,
            PoolAccumulatorEntry {
                legacy_total_value: 100,
                ..Default::default()
            },
        );
        batch.put_position(
            *pool,
            *staker,
            StakePosition {
                amount: 100,
                last_interest_price: Decimal::from_raw(BASIS / 2),
                ..Default::default()
            },
        );
        store.apply(batch).unwrap();
    }

    #[test]
    fn test_legacy_position_combines_both_models() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        seed_legacy(&store, &pool, &alice);

        // (2.0 - 0.5) * 100
        assert_eq!(legacy_bridge_amount(&store, &pool, &alice).unwrap(), 150);

        let ctx = AccrualContext::new(&policy, 10, 0);
        let accrual = compute_accrued(&store, &ctx, &pool, &alice).unwrap();
        assert_eq!(accrual.case, AccrualCase::SoleFirst);
        assert_eq!(accrual.amount, 5_000);
        assert_eq!(withdrawable_amount(&store, &ctx, &pool, &alice).unwrap(), 5_150);
    }

    #[test]
    fn test_settle_pays_legacy_once() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        seed_legacy(&store, &pool, &alice);

        let settlement = settle_at(&store, &policy, &pool, &alice, 10);
        assert_eq!(settlement.legacy, 150);
        assert_eq!(settlement.pending, 5_150);
        assert_eq!(legacy_bridge_amount(&store, &pool, &alice).unwrap(), 0);

        let again = settle_at(&store, &policy, &pool, &alice, 10);
        assert_eq!(again.legacy, 0);
        assert_eq!(again.pending, 5_150);
    }

    #[test]
    fn test_sole_first_and_shared_agree_for_lone_pool() {
        let store = MemoryStore::new();
        let policy = policy();
        let pool = Address::repeat_byte(1);
        let alice = Address::repeat_byte(0xa1);
        stake(&store, &policy, &pool, &alice, 100, 10);

        for now in [11, 20, 57, 1_000] {
            let ctx = AccrualContext::new(&policy, now, 0);
            let position = store.position(&pool, &alice).unwrap();
            let area = cumulative_stake_area(&store, &ctx, &PoolKey::Pool(pool)).unwrap();
            let a = sole_first_accrual(&store, &ctx, &pool, &position).unwrap();
            let c = shared_accrual(&store, &ctx, &pool, &position, &area).unwrap();
            assert_eq!(a, c, "diverged at block {}", now);
        }
    }

    #[test]
    fn test_sole_first_and_shared_diverge_with_older_pool() {
        let store = MemoryStore::new();
        let policy = policy();
        let p = Address::repeat_byte(1);
        let q = Address::repeat_byte(2);
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb0);
        stake(&store, &policy, &q, &bob, 100, 0);
        stake(&store, &policy, &p, &alice, 100, 10);

        // P holds 1000 of 3000 area units at block 20. The first formula
        // applies that fraction to the 10_000 emitted since alice joined, the
        // second to all 20_000 emitted since genesis.
        let ctx = AccrualContext::new(&policy, 20, 0);
        let position = store.position(&p, &alice).unwrap();
        let area = cumulative_stake_area(&store, &ctx, &PoolKey::Pool(p)).unwrap();
        assert_eq!(sole_first_accrual(&store, &ctx, &p, &position).unwrap(), 1_667);
        assert_eq!(shared_accrual(&store, &ctx, &p, &position, &area).unwrap(), 3_333);
        assert_eq!(compute_accrued(&store, &ctx, &p, &alice).unwrap().case, AccrualCase::SoleFirst);
    }
}
