// crates/lockup-core/src/records.rs
//
// Ledger records: the global emission curve, per-pool stake accumulators,
// and per-(pool, staker) stake positions.
//
// A record that has never been written reads as its `Default` value. That is
// the documented zero record, not a missing-key error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::types::{Amount, TimeIndex};

/// Theoretical cumulative emission of the whole protocol.
///
/// `cumulative_emission` never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalEmissionState {
    /// Total ever emitted, as of `last_emission_block`.
    pub cumulative_emission: Amount,
    /// Emission rate per block observed at `last_emission_block`.
    pub last_emission_rate: Amount,
    /// `None` until the curve is committed for the first time.
    pub last_emission_block: Option<TimeIndex>,
}

/// Cumulative stake-area accumulator for one pool or for `PoolKey::All`.
///
/// For any `t >= last_block`:
///   area(t) = cumulative_stake_area + current_stake_unit * (t - last_block)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolAccumulatorEntry {
    /// Integral of staked amount over time, as of `last_block`.
    pub cumulative_stake_area: Amount,
    /// Amount currently staked.
    pub current_stake_unit: Amount,
    /// `None` for pools that predate cumulative accounting.
    pub last_block: Option<TimeIndex>,
    /// Total staked under the superseded accounting, read while `last_block` is `None`.
    pub legacy_total_value: Amount,
    /// Final interest price per staked unit of the superseded accounting.
    pub legacy_interest_price: Decimal,
    /// Sum of legacy positions imported so far; never exceeds `legacy_total_value`.
    pub legacy_imported_value: Amount,
}

impl PoolAccumulatorEntry {
    /// Whether this entry still relies on the pre-migration reading.
    pub fn is_pre_migration(&self) -> bool {
        self.last_block.is_none()
    }
}

/// Lifecycle of a position: Unstaked -> Staked -> Cancelled -> Unstaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Unstaked,
    Staked,
    Cancelled,
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionStatus::Unstaked => write!(f, "Unstaked"),
            PositionStatus::Staked => write!(f, "Staked"),
            PositionStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// One staker's position in one pool.
///
/// Positions are never deleted; releasing zeroes the amount instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakePosition {
    /// Currently staked amount.
    pub amount: Amount,
    /// `None` while not cancelled; otherwise the block at or after which release is permitted.
    pub withdrawal_ready_at: Option<TimeIndex>,
    /// Cumulative emission at the last settlement.
    pub checkpoint_global_reward: Amount,
    /// Pool's cumulative staker interest at the last settlement.
    pub checkpoint_pool_interest: Amount,
    /// Pool's cumulative stake area at the last settlement.
    pub checkpoint_pool_stake_area: Amount,
    /// Block of the last settlement; `None` for positions imported from the legacy ledger.
    pub checkpoint_block: Option<TimeIndex>,
    /// Entitlement settled but not yet withdrawn.
    pub pending_withdrawal: Amount,
    /// Legacy interest price already credited to this position.
    pub last_interest_price: Decimal,
}

impl StakePosition {
    pub fn is_cancelled(&self) -> bool {
        self.withdrawal_ready_at.is_some()
    }

    pub fn status(&self) -> PositionStatus {
        if self.is_cancelled() {
            PositionStatus::Cancelled
        } else if self.amount > 0 {
            PositionStatus::Staked
        } else {
            PositionStatus::Unstaked
        }
    }
}
