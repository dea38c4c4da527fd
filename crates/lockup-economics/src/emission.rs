// crates/lockup-economics/src/emission.rs
//
// Cumulative protocol emission.
//
// The curve is a step function: between two commits the rate is constant
// and equal to the rate recorded at the earlier commit. A rate change read
// from the policy only takes effect from the block it is committed at, so
// rewards for an elapsed interval always use the rate that was in force
// during that interval.

use lockup_core::error::LockupError;
use lockup_core::{Amount, GlobalEmissionState, LedgerView, TimeIndex};
use lockup_store::StagedLedger;

use crate::context::AccrualContext;

/// The emission curve evaluated at `AccrualContext::now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionSnapshot {
    /// Cumulative emission up to `now`.
    pub next_cumulative: Amount,
    /// Rate the policy reports now; in force from the next commit on.
    pub current_rate: Amount,
}

/// Evaluate the curve at `ctx.now` without writing anything.
///
/// Before the first commit there is no recorded block, so nothing has
/// accrued yet and the stored cumulative value is returned unchanged.
pub fn refresh_emission(view: &dyn LedgerView, ctx: &AccrualContext<'_>) -> Result<EmissionSnapshot, LockupError> {
    let current_rate = ctx.policy.max_emission_rate()?;
    let state = view.emission()?;
    let elapsed = match state.last_emission_block {
        Some(block) => ctx.now.saturating_sub(block),
        None => 0,
    };
    let accrued = state
        .last_emission_rate
        .checked_mul(Amount::from(elapsed))
        .ok_or_else(|| LockupError::overflow("emission over elapsed blocks"))?;
    let next_cumulative = state
        .cumulative_emission
        .checked_add(accrued)
        .ok_or_else(|| LockupError::overflow("cumulative emission"))?;
    Ok(EmissionSnapshot {
        next_cumulative,
        current_rate,
    })
}

/// Persist a snapshot as the new curve origin at block `now`.
pub fn commit_emission(tx: &mut StagedLedger<'_>, snapshot: EmissionSnapshot, now: TimeIndex) {
    tx.put_emission(GlobalEmissionState {
        cumulative_emission: snapshot.next_cumulative,
        last_emission_rate: snapshot.current_rate,
        last_emission_block: Some(now),
    });
}
