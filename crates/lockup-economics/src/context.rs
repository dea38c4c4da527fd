// crates/lockup-economics/src/context.rs

use lockup_core::{EmissionPolicy, TimeIndex};

/// Inputs shared by every accrual computation within one operation or query.
///
/// Passed explicitly instead of living in global state, so two engines (or
/// two tests) never observe each other.
#[derive(Clone, Copy)]
pub struct AccrualContext<'a> {
    /// Source of the emission rate and the holder/staker split.
    pub policy: &'a dyn EmissionPolicy,
    /// Block the computation is evaluated at.
    pub now: TimeIndex,
    /// Block that pre-migration pools and positions are measured from.
    pub genesis_block: TimeIndex,
}

impl<'a> AccrualContext<'a> {
    pub fn new(policy: &'a dyn EmissionPolicy, now: TimeIndex, genesis_block: TimeIndex) -> Self {
        Self {
            policy,
            now,
            genesis_block,
        }
    }
}
