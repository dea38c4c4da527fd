// crates/lockup-economics/src/rewards.rs
//
// A pool's share of emission and its holder/staker split.
//
// The pool's share of an emission delta is proportional to its cumulative
// stake area over the protocol-wide cumulative stake area. The policy then
// decides how much of that share goes to the pool's holders; stakers get the
// rest.

use lockup_core::error::LockupError;
use lockup_core::{Address, Amount, Decimal, LedgerView, PoolKey};

use crate::accumulator::cumulative_stake_area;
use crate::context::AccrualContext;
use crate::emission::refresh_emission;

/// A pool's reward over an emission interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardSplit {
    /// Protocol emission since the given checkpoint.
    pub emission_delta: Amount,
    /// This pool's proportional part of `emission_delta`.
    pub pool_share: Amount,
    /// Part of `pool_share` owed to holders.
    pub holder_share: Amount,
    /// Part of `pool_share` owed to stakers (`pool_share - holder_share`).
    pub staker_share: Amount,
}

/// Split the emission issued since `last_emission_checkpoint` for `pool`.
///
/// Pass `0` as the checkpoint to get the pool's cumulative split since
/// genesis. No retries: a policy failure fails the computation.
pub fn split_since(
    view: &dyn LedgerView,
    ctx: &AccrualContext<'_>,
    pool: &Address,
    last_emission_checkpoint: Amount,
) -> Result<RewardSplit, LockupError> {
    let emission = refresh_emission(view, ctx)?;
    let emission_delta = emission
        .next_cumulative
        .saturating_sub(last_emission_checkpoint);

    let pool_area = cumulative_stake_area(view, ctx, &PoolKey::Pool(*pool))?;
    let all_area = cumulative_stake_area(view, ctx, &PoolKey::All)?;
    let pool_fraction = Decimal::ratio(pool_area.area, all_area.area)?;
    let pool_share = pool_fraction.mul_amount(emission_delta)?;

    let holder_share = ctx.policy.split_holder_share(pool_share, pool_area.unit)?;
    if holder_share > pool_share {
        return Err(LockupError::ExternalCapability(format!(
            "policy assigned {} to holders out of a pool reward of {}",
            holder_share, pool_share
        )));
    }

    Ok(RewardSplit {
        emission_delta,
        pool_share,
        holder_share,
        staker_share: pool_share - holder_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{update_stake, StakeDelta};
    use crate::emission::commit_emission;
    use crate::policy::ConfiguredPolicy;
    use lockup_core::{EmissionPolicy, LedgerStore, TimeIndex};
    use lockup_store::{MemoryStore, StagedLedger};

    /// Stake into `pool` at `now` and commit the emission curve, as the engine does.
    fn stake_at(store: &MemoryStore, policy: &ConfiguredPolicy, pool: &Address, amount: Amount, now: TimeIndex) {
        let ctx = AccrualContext::new(policy, now, 0);
        let mut tx = StagedLedger::new(store);
        update_stake(&mut tx, &ctx, pool, StakeDelta::Increase(amount)).unwrap();
        let snapshot = refresh_emission(&tx, &ctx).unwrap();
        commit_emission(&mut tx, snapshot, now);
        let batch = tx.into_batch();
        store.apply(batch).unwrap();
    }

    #[test]
    fn test_only_pool_gets_all_emission() {
        let store = MemoryStore::new();
        let policy = ConfiguredPolicy::new(1_000, 10, 5_000).unwrap();
        let pool = Address::repeat_byte(1);
        stake_at(&store, &policy, &pool, 100, 10);

        let ctx = AccrualContext::new(&policy, 20, 0);
        let split = split_since(&store, &ctx, &pool, 0).unwrap();
        assert_eq!(split.emission_delta, 10_000);
        assert_eq!(split.pool_share, 10_000);
        assert_eq!(split.holder_share, 5_000);
        assert_eq!(split.staker_share, 5_000);
    }

    #[test]
    fn test_checkpoint_limits_delta() {
        let store = MemoryStore::new();
        let policy = ConfiguredPolicy::new(1_000, 10, 5_000).unwrap();
        let pool = Address::repeat_byte(1);
        stake_at(&store, &policy, &pool, 100, 10);

        let ctx = AccrualContext::new(&policy, 20, 0);
        let split = split_since(&store, &ctx, &pool, 4_000).unwrap();
        assert_eq!(split.emission_delta, 6_000);
        assert_eq!(split.pool_share, 6_000);
    }

    #[test]
    fn test_share_follows_cumulative_area() {
        let store = MemoryStore::new();
        let policy = ConfiguredPolicy::new(1_000, 10, 5_000).unwrap();
        let p = Address::repeat_byte(1);
        let q = Address::repeat_byte(2);
        stake_at(&store, &policy, &p, 100, 10);
        stake_at(&store, &policy, &q, 100, 10);

        // Equal stake, equal time: each pool gets half.
        let ctx = AccrualContext::new(&policy, 30, 0);
        let split_p = split_since(&store, &ctx, &p, 0).unwrap();
        let split_q = split_since(&store, &ctx, &q, 0).unwrap();
        assert_eq!(split_p.pool_share, 10_000);
        assert_eq!(split_q.pool_share, 10_000);
    }

    #[test]
    fn test_empty_protocol_has_no_share() {
        let store = MemoryStore::new();
        let policy = ConfiguredPolicy::new(1_000, 10, 5_000).unwrap();
        let ctx = AccrualContext::new(&policy, 30, 0);
        let split = split_since(&store, &ctx, &Address::repeat_byte(1), 0).unwrap();
        assert_eq!(split.pool_share, 0);
        assert_eq!(split.staker_share, 0);
    }

    struct GreedyPolicy;

    impl EmissionPolicy for GreedyPolicy {
        fn max_emission_rate(&self) -> Result<Amount, LockupError> {
            Ok(1_000)
        }
        fn lockup_duration(&self) -> Result<TimeIndex, LockupError> {
            Ok(1)
        }
        fn split_holder_share(&self, pool_reward: Amount, _staked: Amount) -> Result<Amount, LockupError> {
            Ok(pool_reward + 1)
        }
    }

    #[test]
    fn test_policy_overshoot_is_external_failure() {
        let store = MemoryStore::new();
        let policy = ConfiguredPolicy::new(1_000, 10, 5_000).unwrap();
        let pool = Address::repeat_byte(1);
        stake_at(&store, &policy, &pool, 100, 10);

        let greedy = GreedyPolicy;
        let ctx = AccrualContext::new(&greedy, 20, 0);
        let err = split_since(&store, &ctx, &pool, 0).unwrap_err();
        assert_eq!(err.code(), "external_capability_failure");
    }
}
