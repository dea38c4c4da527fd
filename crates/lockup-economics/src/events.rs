// crates/lockup-economics/src/events.rs
//
// Events returned by every committed ledger mutation.
//
// The engine logs each event with tracing and hands it back to the caller;
// the CLI prints it as a table row or as JSON.

use std::fmt;

use lockup_core::{Address, Amount, Decimal, TimeIndex};
use serde::{Deserialize, Serialize};

/// A committed change to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    StakeRecorded {
        pool: Address,
        staker: Address,
        /// Amount added by this call.
        amount: Amount,
        /// Staker's position after the call.
        total: Amount,
        /// Interest credited to `pending_withdrawal` by the settlement.
        settled: Amount,
        block: TimeIndex,
    },
    StakeCancelled {
        pool: Address,
        staker: Address,
        amount: Amount,
        /// First block at which release is permitted.
        ready_at: TimeIndex,
        block: TimeIndex,
    },
    StakeReleased {
        pool: Address,
        staker: Address,
        /// Principal returned to the staker.
        amount: Amount,
        block: TimeIndex,
    },
    InterestWithdrawn {
        pool: Address,
        staker: Address,
        /// Amount minted to the staker.
        amount: Amount,
        block: TimeIndex,
    },
    EmissionRefreshed {
        cumulative_emission: Amount,
        rate: Amount,
        block: TimeIndex,
    },
    LegacyPoolImported {
        pool: Address,
        total_value: Amount,
        interest_price: Decimal,
    },
    LegacyPositionImported {
        pool: Address,
        staker: Address,
        amount: Amount,
        last_interest_price: Decimal,
    },
}

impl LedgerEvent {
    /// Short snake_case name, matching the serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::StakeRecorded { .. } => "stake_recorded",
            LedgerEvent::StakeCancelled { .. } => "stake_cancelled",
            LedgerEvent::StakeReleased { .. } => "stake_released",
            LedgerEvent::InterestWithdrawn { .. } => "interest_withdrawn",
            LedgerEvent::EmissionRefreshed { .. } => "emission_refreshed",
            LedgerEvent::LegacyPoolImported { .. } => "legacy_pool_imported",
            LedgerEvent::LegacyPositionImported { .. } => "legacy_position_imported",
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::StakeRecorded {
                pool,
                staker,
                amount,
                total,
                block,
                ..
            } => write!(f, "{} staked {} in {} (total {}) at block {}", staker, amount, pool, total, block),
            LedgerEvent::StakeCancelled {
                pool,
                staker,
                ready_at,
                ..
            } => write!(f, "{} cancelled stake in {}, releasable at block {}", staker, pool, ready_at),
            LedgerEvent::StakeReleased {
                pool,
                staker,
                amount,
                block,
            } => write!(f, "{} released {} from {} at block {}", staker, amount, pool, block),
            LedgerEvent::InterestWithdrawn {
                pool,
                staker,
                amount,
                block,
            } => write!(f, "{} withdrew {} interest from {} at block {}", staker, amount, pool, block),
            LedgerEvent::EmissionRefreshed {
                cumulative_emission,
                rate,
                block,
            } => write!(f, "emission {} at rate {} as of block {}", cumulative_emission, rate, block),
            LedgerEvent::LegacyPoolImported {
                pool,
                total_value,
                interest_price,
            } => write!(f, "imported legacy pool {} ({} staked, price {})", pool, total_value, interest_price),
            LedgerEvent::LegacyPositionImported {
                pool,
                staker,
                amount,
                ..
            } => write!(f, "imported legacy position {} in {} ({} staked)", staker, pool, amount),
        }
    }
}
