// crates/lockup-economics/src/policy.rs
//
// Default emission policy: a fixed per-block emission rate, a fixed lockup
// length, and a holder/staker split expressed in basis points.
//
// A pool with nothing staked pays its whole reward to holders; once stake is
// present, holders receive `holder_share_bps / 10_000` of it (rounded down)
// and stakers the remainder.

use serde::{Deserialize, Serialize};

use lockup_core::error::LockupError;
use lockup_core::{mul_div, Amount, EmissionPolicy, TimeIndex};

/// Basis-point denominator: 10,000 bps = 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default maximum emission per block: 1 token at 18 decimals.
pub const DEFAULT_MAX_EMISSION_RATE: Amount = 1_000_000_000_000_000_000;

/// Default lockup after cancellation: 175,200 blocks (~30 days at 15s/block).
pub const DEFAULT_LOCKUP_DURATION: TimeIndex = 175_200;

/// Default holder share of a staked pool's reward: 95%.
pub const DEFAULT_HOLDER_SHARE_BPS: u32 = 9_500;

/// Policy with fixed parameters, typically loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredPolicy {
    max_emission_rate: Amount,
    lockup_duration: TimeIndex,
    holder_share_bps: u32,
}

impl ConfiguredPolicy {
    /// Build a policy.
    ///
    /// # Errors
    /// Returns `LockupError::InvalidArgument` if `holder_share_bps` exceeds 10,000.
    pub fn new(
        max_emission_rate: Amount,
        lockup_duration: TimeIndex,
        holder_share_bps: u32,
    ) -> Result<Self, LockupError> {
        if holder_share_bps > BPS_DENOMINATOR {
            return Err(LockupError::InvalidArgument(format!(
                "holder share of {} bps exceeds {} bps",
                holder_share_bps, BPS_DENOMINATOR
            )));
        }
        Ok(Self {
            max_emission_rate,
            lockup_duration,
            holder_share_bps,
        })
    }

    pub fn holder_share_bps(&self) -> u32 {
        self.holder_share_bps
    }
}

impl Default for ConfiguredPolicy {
    fn default() -> Self {
        Self {
            max_emission_rate: DEFAULT_MAX_EMISSION_RATE,
            lockup_duration: DEFAULT_LOCKUP_DURATION,
            holder_share_bps: DEFAULT_HOLDER_SHARE_BPS,
        }
    }
}

impl EmissionPolicy for ConfiguredPolicy {
    fn max_emission_rate(&self) -> Result<Amount, LockupError> {
        Ok(self.max_emission_rate)
    }

    fn lockup_duration(&self) -> Result<TimeIndex, LockupError> {
        Ok(self.lockup_duration)
    }

    fn split_holder_share(&self, pool_reward: Amount, staked_in_pool: Amount) -> Result<Amount, LockupError> {
        if staked_in_pool == 0 {
            return Ok(pool_reward);
        }
        mul_div(
            pool_reward,
            Amount::from(self.holder_share_bps),
            Amount::from(BPS_DENOMINATOR),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_share_above_100_percent() {
        assert!(ConfiguredPolicy::new(1, 1, BPS_DENOMINATOR + 1).is_err());
        assert!(ConfiguredPolicy::new(1, 1, BPS_DENOMINATOR).is_ok());
    }

    #[test]
    fn test_unstaked_pool_pays_holders_everything() {
        let policy = ConfiguredPolicy::default();
        assert_eq!(policy.split_holder_share(1_000, 0).unwrap(), 1_000);
    }

    #[test]
    fn test_staked_pool_split() {
        let policy = ConfiguredPolicy::new(1, 1, 9_500).unwrap();
        assert_eq!(policy.split_holder_share(1_000, 1).unwrap(), 950);
    }

    #[test]
    fn test_split_rounds_down() {
        let policy = ConfiguredPolicy::new(1, 1, 5_000).unwrap();
        assert_eq!(policy.split_holder_share(7, 10).unwrap(), 3);
    }

    #[test]
    fn test_defaults() {
        let policy = ConfiguredPolicy::default();
        assert_eq!(policy.max_emission_rate().unwrap(), DEFAULT_MAX_EMISSION_RATE);
        assert_eq!(policy.lockup_duration().unwrap(), DEFAULT_LOCKUP_DURATION);
        assert_eq!(policy.holder_share_bps(), DEFAULT_HOLDER_SHARE_BPS);
    }
}
