// crates/lockup-economics/src/engine.rs
//
// Stake lifecycle: stake, cancel, release-and-withdraw, withdraw-interest.
//
// Per (pool, staker):
//
//   Unstaked --stake--> Staked --cancel--> Cancelled --release--> Unstaked
//
// A cancelled stake is only reversed by releasing it. Every operation is
// staged against the store and applied as one batch after all checks,
// arithmetic and collaborator calls have succeeded, so a failure leaves the
// ledger untouched. If the batch itself fails to apply, the operation's
// token movement is reversed before the error is returned.
//
// Mutations hold the engine's writer lock from the first read to the apply.

use std::sync::{Arc, Mutex, MutexGuard};

use lockup_core::error::LockupError;
use lockup_core::{
    Address, Amount, Clock, EmissionPolicy, FungibleToken, GlobalEmissionState, LedgerStore, LedgerView, PoolKey,
    PoolRegistry, StakePosition, TimeIndex,
};
use lockup_store::StagedLedger;

use crate::accumulator::{cumulative_stake_area, update_stake, StakeArea, StakeDelta};
use crate::context::AccrualContext;
use crate::emission::{self, commit_emission, EmissionSnapshot};
use crate::events::LedgerEvent;
use crate::ledger::{refresh_interest_checkpoint, settle, withdrawable_amount};
use crate::rewards::split_since;

/// External capabilities the engine consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn PoolRegistry>,
    pub policy: Arc<dyn EmissionPolicy>,
    pub token: Arc<dyn FungibleToken>,
    pub clock: Arc<dyn Clock>,
}

/// Token side effect of one operation, kept so it can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenMove {
    Transfer { from: Address, to: Address, amount: Amount },
    Mint { to: Address, amount: Amount },
}

/// The staking ledger over a `LedgerStore`.
///
/// Safe to share between threads: mutations are serialized internally and
/// queries always see the last applied batch.
pub struct LockupEngine<S: LedgerStore> {
    pub(crate) store: S,
    pub(crate) collaborators: Collaborators,
    pub(crate) genesis_block: TimeIndex,
    /// Held by every mutation across staging, token calls, and apply.
    write_lock: Mutex<()>,
}

impl<S: LedgerStore> LockupEngine<S> {
    /// Create an engine. `genesis_block` is the block pre-migration pools and
    /// positions are measured from.
    pub fn new(store: S, collaborators: Collaborators, genesis_block: TimeIndex) -> Self {
        Self {
            store,
            collaborators,
            genesis_block,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub(crate) fn context(&self, now: TimeIndex) -> AccrualContext<'_> {
        AccrualContext::new(self.collaborators.policy.as_ref(), now, self.genesis_block)
    }

    /// Current block, refusing a clock that runs behind the last commit.
    fn now_checked(&self) -> Result<TimeIndex, LockupError> {
        let now = self.collaborators.clock.now();
        if let Some(last) = self.store.emission()?.last_emission_block {
            if now < last {
                return Err(LockupError::IllegalState(format!(
                    "clock moved backwards: block {} is before last commit at block {}",
                    now, last
                )));
            }
        }
        Ok(now)
    }

    fn require_registered(&self, pool: &Address) -> Result<(), LockupError> {
        if !self.collaborators.registry.is_registered_pool(pool) {
            return Err(LockupError::InvalidArgument(format!("pool {} is not registered", pool)));
        }
        Ok(())
    }

    /// Take the single-writer lock. Hold the guard until the batch is applied.
    pub(crate) fn writer(&self) -> Result<MutexGuard<'_, ()>, LockupError> {
        self.write_lock
            .lock()
            .map_err(|_| LockupError::Storage("ledger writer lock poisoned".to_string()))
    }

    pub(crate) fn commit(&self, tx: StagedLedger<'_>, event: LedgerEvent) -> Result<LedgerEvent, LockupError> {
        self.commit_with(tx, None, event)
    }

    /// Perform `token_move`, then apply the staged batch. A failed apply
    /// reverses the token movement.
    pub(crate) fn commit_with(
        &self,
        tx: StagedLedger<'_>,
        token_move: Option<TokenMove>,
        event: LedgerEvent,
    ) -> Result<LedgerEvent, LockupError> {
        let batch = tx.into_batch();
        let records = batch.len();
        if let Some(movement) = token_move {
            self.move_tokens(movement)?;
        }
        if let Err(err) = self.store.apply(batch) {
            if let Some(movement) = token_move {
                match self.reverse_tokens(movement) {
                    Ok(()) => tracing::warn!(
                        event = event.name(),
                        error = %err,
                        "Ledger write failed; token movement reversed"
                    ),
                    Err(undo) => tracing::error!(
                        event = event.name(),
                        error = %err,
                        undo_error = %undo,
                        ?movement,
                        "Ledger write failed and token movement could not be reversed"
                    ),
                }
            }
            return Err(err);
        }
        tracing::info!(event = event.name(), records, "{}", event);
        Ok(event)
    }

    fn move_tokens(&self, movement: TokenMove) -> Result<(), LockupError> {
        let token = &self.collaborators.token;
        match movement {
            TokenMove::Transfer { from, to, amount } => token.transfer(&from, &to, amount),
            TokenMove::Mint { to, amount } => token.mint(&to, amount),
        }
    }

    fn reverse_tokens(&self, movement: TokenMove) -> Result<(), LockupError> {
        let token = &self.collaborators.token;
        match movement {
            TokenMove::Transfer { from, to, amount } => token.transfer(&to, &from, amount),
            TokenMove::Mint { to, amount } => token.burn(&to, amount),
        }
    }

    // --- Lifecycle ---

    /// Lock `amount` of `staker`'s tokens against `pool`.
    ///
    /// Settles the staker's accrual first, moves the tokens into the pool's
    /// escrow account, and commits the emission curve.
    pub fn stake(&self, pool: &Address, staker: &Address, amount: Amount) -> Result<LedgerEvent, LockupError> {
        let _writer = self.writer()?;
        let now = self.now_checked()?;
        if amount == 0 {
            return Err(LockupError::InvalidArgument(
                "stake amount must be greater than zero".to_string(),
            ));
        }
        self.require_registered(pool)?;

        let ctx = self.context(now);
        let mut tx = StagedLedger::new(&self.store);
        if let Some(ready_at) = tx.position(pool, staker)?.withdrawal_ready_at {
            return Err(LockupError::IllegalState(format!(
                "stake of {} in {} is cancelled (releasable at block {}); release it before staking again",
                staker, pool, ready_at
            )));
        }

        let settlement = settle(&mut tx, &ctx, pool, staker)?;
        update_stake(&mut tx, &ctx, pool, StakeDelta::Increase(amount))?;
        let mut position = tx.position(pool, staker)?;
        position.amount = position
            .amount
            .checked_add(amount)
            .ok_or_else(|| LockupError::overflow("staked amount"))?;
        let total = position.amount;
        tx.put_position(*pool, *staker, position);
        refresh_interest_checkpoint(&mut tx, &ctx, pool, staker)?;

        let snapshot = emission::refresh_emission(&tx, &ctx)?;
        commit_emission(&mut tx, snapshot, now);

        self.commit_with(
            tx,
            Some(TokenMove::Transfer {
                from: *staker,
                to: *pool,
                amount,
            }),
            LedgerEvent::StakeRecorded {
                pool: *pool,
                staker: *staker,
                amount,
                total,
                settled: settlement.accrued.saturating_add(settlement.legacy),
                block: now,
            },
        )
    }

    /// Start the lockup period on `staker`'s stake in `pool`.
    pub fn cancel(&self, pool: &Address, staker: &Address) -> Result<LedgerEvent, LockupError> {
        let _writer = self.writer()?;
        let now = self.now_checked()?;
        let mut tx = StagedLedger::new(&self.store);
        let mut position = tx.position(pool, staker)?;
        if position.amount == 0 {
            return Err(LockupError::IllegalState(format!(
                "no stake to cancel for {} in {}",
                staker, pool
            )));
        }
        if let Some(ready_at) = position.withdrawal_ready_at {
            return Err(LockupError::IllegalState(format!(
                "stake of {} in {} is already cancelled (releasable at block {})",
                staker, pool, ready_at
            )));
        }

        let lockup = self.collaborators.policy.lockup_duration()?;
        let ready_at = now
            .checked_add(lockup)
            .ok_or_else(|| LockupError::overflow("withdrawal ready block"))?;
        position.withdrawal_ready_at = Some(ready_at);
        let amount = position.amount;
        tx.put_position(*pool, *staker, position);

        self.commit(
            tx,
            LedgerEvent::StakeCancelled {
                pool: *pool,
                staker: *staker,
                amount,
                ready_at,
                block: now,
            },
        )
    }

    /// Return a cancelled stake to `staker` once its lockup has elapsed.
    ///
    /// With a lockup of exactly one block the readiness check is skipped:
    /// a cancelled stake can be released at any later call.
    pub fn release_and_withdraw(&self, pool: &Address, staker: &Address) -> Result<LedgerEvent, LockupError> {
        let _writer = self.writer()?;
        let now = self.now_checked()?;
        let ctx = self.context(now);
        let mut tx = StagedLedger::new(&self.store);
        let position = tx.position(pool, staker)?;
        let ready_at = position.withdrawal_ready_at.ok_or_else(|| {
            LockupError::IllegalState(format!("stake of {} in {} is not cancelled", staker, pool))
        })?;
        let lockup = self.collaborators.policy.lockup_duration()?;
        if now < ready_at && lockup != 1 {
            return Err(LockupError::IllegalState(format!(
                "lockup not elapsed: release possible at block {}",
                ready_at
            )));
        }
        if position.amount == 0 {
            return Err(LockupError::IllegalState(format!(
                "nothing staked to release for {} in {}",
                staker, pool
            )));
        }

        settle(&mut tx, &ctx, pool, staker)?;
        let mut position = tx.position(pool, staker)?;
        let amount = position.amount;
        update_stake(&mut tx, &ctx, pool, StakeDelta::Decrease(amount))?;
        position.amount = 0;
        position.withdrawal_ready_at = None;
        tx.put_position(*pool, *staker, position);

        let snapshot = emission::refresh_emission(&tx, &ctx)?;
        commit_emission(&mut tx, snapshot, now);

        self.commit_with(
            tx,
            Some(TokenMove::Transfer {
                from: *pool,
                to: *staker,
                amount,
            }),
            LedgerEvent::StakeReleased {
                pool: *pool,
                staker: *staker,
                amount,
                block: now,
            },
        )
    }

    /// Mint everything `staker` has accrued in `pool`.
    pub fn withdraw_interest(&self, pool: &Address, staker: &Address) -> Result<LedgerEvent, LockupError> {
        let _writer = self.writer()?;
        let now = self.now_checked()?;
        let ctx = self.context(now);
        let mut tx = StagedLedger::new(&self.store);

        let settlement = settle(&mut tx, &ctx, pool, staker)?;
        if settlement.pending == 0 {
            return Err(LockupError::IllegalState(format!(
                "nothing to withdraw for {} in {}",
                staker, pool
            )));
        }
        let mut position = tx.position(pool, staker)?;
        let amount = position.pending_withdrawal;
        position.pending_withdrawal = 0;
        tx.put_position(*pool, *staker, position);

        let snapshot = emission::refresh_emission(&tx, &ctx)?;
        commit_emission(&mut tx, snapshot, now);

        self.commit_with(
            tx,
            Some(TokenMove::Mint { to: *staker, amount }),
            LedgerEvent::InterestWithdrawn {
                pool: *pool,
                staker: *staker,
                amount,
                block: now,
            },
        )
    }

    /// Commit the emission curve at the current block without any stake change.
    ///
    /// Makes a new policy rate take effect from now.
    pub fn refresh_emission(&self) -> Result<LedgerEvent, LockupError> {
        let _writer = self.writer()?;
        let now = self.now_checked()?;
        let ctx = self.context(now);
        let mut tx = StagedLedger::new(&self.store);
        let snapshot = emission::refresh_emission(&tx, &ctx)?;
        commit_emission(&mut tx, snapshot, now);
        self.commit(
            tx,
            LedgerEvent::EmissionRefreshed {
                cumulative_emission: snapshot.next_cumulative,
                rate: snapshot.current_rate,
                block: now,
            },
        )
    }

    // --- Queries ---

    /// Accrued plus pending plus legacy interest at the current block.
    pub fn withdrawable_amount(&self, pool: &Address, staker: &Address) -> Result<Amount, LockupError> {
        let ctx = self.context(self.collaborators.clock.now());
        withdrawable_amount(&self.store, &ctx, pool, staker)
    }

    pub fn current_stake(&self, pool: &Address, staker: &Address) -> Result<Amount, LockupError> {
        Ok(self.store.position(pool, staker)?.amount)
    }

    pub fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError> {
        self.store.position(pool, staker)
    }

    pub fn pool_total_staked(&self, pool: &Address) -> Result<Amount, LockupError> {
        Ok(self.cumulative_stake_area(&PoolKey::Pool(*pool))?.unit)
    }

    pub fn total_staked_all_pools(&self) -> Result<Amount, LockupError> {
        Ok(self.cumulative_stake_area(&PoolKey::All)?.unit)
    }

    /// Stake area of a pool (or the aggregate) at the current block.
    pub fn cumulative_stake_area(&self, key: &PoolKey) -> Result<StakeArea, LockupError> {
        let ctx = self.context(self.collaborators.clock.now());
        cumulative_stake_area(&self.store, &ctx, key)
    }

    /// The emission record as last committed.
    pub fn emission_state(&self) -> Result<GlobalEmissionState, LockupError> {
        self.store.emission()
    }

    /// The emission curve evaluated at the current block.
    pub fn projected_emission(&self) -> Result<EmissionSnapshot, LockupError> {
        let ctx = self.context(self.collaborators.clock.now());
        emission::refresh_emission(&self.store, &ctx)
    }

    /// Holder-side share of the pool's emission since genesis.
    pub fn cumulative_holders_reward(&self, pool: &Address) -> Result<Amount, LockupError> {
        let ctx = self.context(self.collaborators.clock.now());
        Ok(split_since(&self.store, &ctx, pool, 0)?.holder_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::policy::ConfiguredPolicy;
    use crate::registry::StaticRegistry;
    use crate::token::InMemoryToken;
    use std::sync::atomic::{AtomicBool, Ordering};

    use lockup_core::{LedgerBatch, PoolAccumulatorEntry, PositionStatus};
    use lockup_store::MemoryStore;

    const POOL: Address = Address::repeat_byte(0x01);
    const ALICE: Address = Address::repeat_byte(0xa1);

    struct Harness {
        engine: LockupEngine<MemoryStore>,
        clock: Arc<ManualClock>,
        token: Arc<InMemoryToken>,
    }

    fn harness(lockup: TimeIndex) -> Harness {
        let clock = Arc::new(ManualClock::new(10));
        let token = Arc::new(InMemoryToken::new());
        token.mint(&ALICE, 1_000_000).unwrap();
        let collaborators = Collaborators {
            registry: Arc::new(StaticRegistry::new([POOL])),
            policy: Arc::new(ConfiguredPolicy::new(1_000, lockup, 5_000).unwrap()),
            token: token.clone(),
            clock: clock.clone(),
        };
        Harness {
            engine: LockupEngine::new(MemoryStore::new(), collaborators, 0),
            clock,
            token,
        }
    }

    /// Memory store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl LedgerView for FlakyStore {
        fn emission(&self) -> Result<GlobalEmissionState, LockupError> {
            self.inner.emission()
        }

        fn pool(&self, key: &PoolKey) -> Result<PoolAccumulatorEntry, LockupError> {
            self.inner.pool(key)
        }

        fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError> {
            self.inner.position(pool, staker)
        }
    }

    impl LedgerStore for FlakyStore {
        fn apply(&self, batch: LedgerBatch) -> Result<(), LockupError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(LockupError::Storage("disk full".to_string()));
            }
            self.inner.apply(batch)
        }
    }

    fn flaky_engine(clock: Arc<ManualClock>, token: Arc<InMemoryToken>) -> LockupEngine<FlakyStore> {
        let collaborators = Collaborators {
            registry: Arc::new(StaticRegistry::new([POOL])),
            policy: Arc::new(ConfiguredPolicy::new(1_000, 1, 5_000).unwrap()),
            token,
            clock,
        };
        LockupEngine::new(FlakyStore::default(), collaborators, 0)
    }

    #[test]
    fn test_stake_moves_tokens_into_escrow() {
        let h = harness(100);
        let event = h.engine.stake(&POOL, &ALICE, 400).unwrap();
        assert_eq!(event.name(), "stake_recorded");
        assert_eq!(h.engine.current_stake(&POOL, &ALICE).unwrap(), 400);
        assert_eq!(h.engine.pool_total_staked(&POOL).unwrap(), 400);
        assert_eq!(h.engine.total_staked_all_pools().unwrap(), 400);
        assert_eq!(h.token.balance_of(&POOL).unwrap(), 400);
        assert_eq!(h.token.balance_of(&ALICE).unwrap(), 999_600);
        assert_eq!(h.engine.emission_state().unwrap().last_emission_block, Some(10));
    }

    #[test]
    fn test_stake_rejects_zero_amount() {
        let h = harness(100);
        let err = h.engine.stake(&POOL, &ALICE, 0).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn test_stake_rejects_unregistered_pool() {
        let h = harness(100);
        let other = Address::repeat_byte(0x02);
        let err = h.engine.stake(&other, &ALICE, 10).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
        assert!(err.to_string().contains("is not registered"));
    }

    #[test]
    fn test_stake_without_funds_fails_cleanly() {
        let h = harness(100);
        let broke = Address::repeat_byte(0xee);
        let err = h.engine.stake(&POOL, &broke, 10).unwrap_err();
        assert_eq!(err.code(), "external_capability_failure");
        assert_eq!(h.engine.pool_total_staked(&POOL).unwrap(), 0);
        assert_eq!(h.engine.emission_state().unwrap(), GlobalEmissionState::default());
    }

    #[test]
    fn test_cancel_requires_stake() {
        let h = harness(100);
        let err = h.engine.cancel(&POOL, &ALICE).unwrap_err();
        assert_eq!(err.code(), "illegal_state");
    }

    #[test]
    fn test_cancel_twice_rejected() {
        let h = harness(100);
        h.engine.stake(&POOL, &ALICE, 10).unwrap();
        h.engine.cancel(&POOL, &ALICE).unwrap();
        let err = h.engine.cancel(&POOL, &ALICE).unwrap_err();
        assert_eq!(err.code(), "illegal_state");
        assert!(err.to_string().contains("already cancelled"));
    }

    #[test]
    fn test_cancelled_position_cannot_stake() {
        let h = harness(100);
        h.engine.stake(&POOL, &ALICE, 10).unwrap();
        h.engine.cancel(&POOL, &ALICE).unwrap();
        let err = h.engine.stake(&POOL, &ALICE, 10).unwrap_err();
        assert_eq!(err.code(), "illegal_state");
    }

    #[test]
    fn test_release_waits_for_lockup() {
        let h = harness(100);
        h.engine.stake(&POOL, &ALICE, 10).unwrap();
        h.clock.set(20);
        h.engine.cancel(&POOL, &ALICE).unwrap();

        h.clock.set(119);
        let err = h.engine.release_and_withdraw(&POOL, &ALICE).unwrap_err();
        assert_eq!(err.to_string(), "Illegal state: lockup not elapsed: release possible at block 120");

        h.clock.set(120);
        h.engine.release_and_withdraw(&POOL, &ALICE).unwrap();
        let position = h.engine.position(&POOL, &ALICE).unwrap();
        assert_eq!(position.status(), PositionStatus::Unstaked);
        assert_eq!(position.withdrawal_ready_at, None);
        assert_eq!(h.token.balance_of(&ALICE).unwrap(), 1_000_000);
        assert_eq!(h.engine.pool_total_staked(&POOL).unwrap(), 0);
    }

    #[test]
    fn test_release_requires_cancel() {
        let h = harness(100);
        h.engine.stake(&POOL, &ALICE, 10).unwrap();
        let err = h.engine.release_and_withdraw(&POOL, &ALICE).unwrap_err();
        assert_eq!(err.code(), "illegal_state");
    }

    #[test]
    fn test_single_block_lockup_releases_immediately() {
        let h = harness(1);
        h.engine.stake(&POOL, &ALICE, 10).unwrap();
        h.engine.cancel(&POOL, &ALICE).unwrap();
        // Still at the cancellation block.
        h.engine.release_and_withdraw(&POOL, &ALICE).unwrap();
        assert_eq!(h.engine.current_stake(&POOL, &ALICE).unwrap(), 0);
    }

    #[test]
    fn test_withdraw_nothing_rejected() {
        let h = harness(100);
        let err = h.engine.withdraw_interest(&POOL, &ALICE).unwrap_err();
        assert_eq!(err.code(), "illegal_state");
        assert!(err.to_string().contains("nothing to withdraw"));
    }

    #[test]
    fn test_withdraw_interest_mints() {
        let h = harness(100);
        h.engine.stake(&POOL, &ALICE, 10).unwrap();
        h.clock.set(20);
        assert_eq!(h.engine.withdrawable_amount(&POOL, &ALICE).unwrap(), 5_000);
        assert_eq!(h.engine.cumulative_holders_reward(&POOL).unwrap(), 5_000);

        let event = h.engine.withdraw_interest(&POOL, &ALICE).unwrap();
        assert_eq!(
            event,
            LedgerEvent::InterestWithdrawn {
                pool: POOL,
                staker: ALICE,
                amount: 5_000,
                block: 20,
            }
        );
        assert_eq!(h.token.balance_of(&ALICE).unwrap(), 999_990 + 5_000);
        assert_eq!(h.engine.withdrawable_amount(&POOL, &ALICE).unwrap(), 0);
    }

    #[test]
    fn test_clock_running_backwards_rejected() {
        let h = harness(100);
        h.clock.set(50);
        h.engine.refresh_emission().unwrap();
        h.clock.set(40);
        let err = h.engine.stake(&POOL, &ALICE, 10).unwrap_err();
        assert_eq!(err.code(), "illegal_state");
        assert!(err.to_string().contains("clock moved backwards"));
    }

    #[test]
    fn test_refresh_emission_commits_curve() {
        let h = harness(100);
        h.engine.refresh_emission().unwrap();
        h.clock.set(30);
        assert_eq!(h.engine.projected_emission().unwrap().next_cumulative, 20_000);
        let event = h.engine.refresh_emission().unwrap();
        assert_eq!(
            event,
            LedgerEvent::EmissionRefreshed {
                cumulative_emission: 20_000,
                rate: 1_000,
                block: 30,
            }
        );
        assert_eq!(h.engine.emission_state().unwrap().cumulative_emission, 20_000);
    }

    #[test]
    fn test_refilled_pool_checkpoints_interest_after_stake() {
        let h = harness(1);
        let bob = Address::repeat_byte(0xb0);
        h.token.mint(&bob, 1_000).unwrap();

        h.engine.stake(&POOL, &ALICE, 100).unwrap();
        h.clock.set(20);
        h.engine.cancel(&POOL, &ALICE).unwrap();
        h.engine.release_and_withdraw(&POOL, &ALICE).unwrap();
        h.engine.withdraw_interest(&POOL, &ALICE).unwrap();
        assert_eq!(h.engine.pool_total_staked(&POOL).unwrap(), 0);

        // The pool refills with two stakers in one block.
        h.clock.set(30);
        h.engine.stake(&POOL, &ALICE, 300).unwrap();
        h.engine.stake(&POOL, &bob, 100).unwrap();
        let first = h.engine.position(&POOL, &ALICE).unwrap();
        let second = h.engine.position(&POOL, &bob).unwrap();
        assert_eq!(first.checkpoint_pool_interest, 10_000);
        assert_eq!(first.checkpoint_pool_interest, second.checkpoint_pool_interest);

        // 10 blocks at 1_000, half to stakers, split 3:1.
        h.clock.set(40);
        assert_eq!(h.engine.withdrawable_amount(&POOL, &ALICE).unwrap(), 3_750);
        assert_eq!(h.engine.withdrawable_amount(&POOL, &bob).unwrap(), 1_250);
    }

    #[test]
    fn test_concurrent_stakes_keep_totals_consistent() {
        let h = harness(100);
        let stakers: Vec<Address> = (0..16u8).map(|i| Address::repeat_byte(0x40 + i)).collect();
        for staker in &stakers {
            h.token.mint(staker, 5).unwrap();
        }

        std::thread::scope(|scope| {
            for staker in &stakers {
                let engine = &h.engine;
                scope.spawn(move || {
                    for _ in 0..5 {
                        engine.stake(&POOL, staker, 1).unwrap();
                    }
                });
            }
        });

        let staked: Amount = stakers
            .iter()
            .map(|staker| h.engine.current_stake(&POOL, staker).unwrap())
            .sum();
        assert_eq!(staked, 80);
        assert_eq!(h.engine.pool_total_staked(&POOL).unwrap(), 80);
        assert_eq!(h.engine.total_staked_all_pools().unwrap(), 80);
        assert_eq!(h.token.balance_of(&POOL).unwrap(), 80);
    }

    #[test]
    fn test_failed_write_returns_staked_tokens() {
        let clock = Arc::new(ManualClock::new(10));
        let token = Arc::new(InMemoryToken::new());
        token.mint(&ALICE, 500).unwrap();
        let engine = flaky_engine(clock, token.clone());

        engine.store().fail_writes.store(true, Ordering::SeqCst);
        let err = engine.stake(&POOL, &ALICE, 200).unwrap_err();
        assert_eq!(err.code(), "storage");
        assert_eq!(token.balance_of(&ALICE).unwrap(), 500);
        assert_eq!(token.balance_of(&POOL).unwrap(), 0);
        assert_eq!(engine.pool_total_staked(&POOL).unwrap(), 0);
    }

    #[test]
    fn test_failed_write_returns_released_tokens_to_escrow() {
        let clock = Arc::new(ManualClock::new(10));
        let token = Arc::new(InMemoryToken::new());
        token.mint(&ALICE, 500).unwrap();
        let engine = flaky_engine(clock, token.clone());
        engine.stake(&POOL, &ALICE, 200).unwrap();
        engine.cancel(&POOL, &ALICE).unwrap();

        engine.store().fail_writes.store(true, Ordering::SeqCst);
        assert!(engine.release_and_withdraw(&POOL, &ALICE).is_err());
        assert_eq!(token.balance_of(&POOL).unwrap(), 200);
        assert_eq!(token.balance_of(&ALICE).unwrap(), 300);
        assert_eq!(engine.current_stake(&POOL, &ALICE).unwrap(), 200);
    }

    #[test]
    fn test_failed_write_burns_minted_interest() {
        let clock = Arc::new(ManualClock::new(10));
        let token = Arc::new(InMemoryToken::new());
        token.mint(&ALICE, 500).unwrap();
        let engine = flaky_engine(clock.clone(), token.clone());
        engine.stake(&POOL, &ALICE, 100).unwrap();
        clock.set(20);

        engine.store().fail_writes.store(true, Ordering::SeqCst);
        assert!(engine.withdraw_interest(&POOL, &ALICE).is_err());
        assert_eq!(token.balance_of(&ALICE).unwrap(), 400);
        assert_eq!(token.total_supply().unwrap(), 500);
        assert_eq!(engine.withdrawable_amount(&POOL, &ALICE).unwrap(), 5_000);
    }
}
