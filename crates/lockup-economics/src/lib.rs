// crates/lockup-economics/src/lib.rs
//
// lockup-economics: reward accounting for the Lockup staking ledger.
//
// Rewards accrue continuously to pools whose size and membership change
// arbitrarily often. Each staker's entitlement is computed lazily from
// cumulative sums (emission issued, stake-area per pool) without iterating
// over other stakers:
//
//   emission     - cumulative protocol emission as a step function of time
//   accumulator  - per-pool and protocol-wide cumulative stake area
//   rewards      - a pool's share of emission, split between holders and stakers
//   ledger       - per-staker accrual, settlement, and withdrawable amount
//   engine       - stake / cancel / release / withdraw-interest lifecycle
//
// All amounts are integers in the token's smallest unit; fractions use
// `lockup_core::Decimal` (scale 10^18, floor rounding).

pub mod accumulator;
pub mod clock;
pub mod context;
pub mod emission;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod migration;
pub mod policy;
pub mod registry;
pub mod rewards;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use accumulator::{cumulative_stake_area, update_stake, StakeArea, StakeDelta};
pub use clock::ManualClock;
pub use context::AccrualContext;
pub use emission::{EmissionSnapshot, commit_emission, refresh_emission};
pub use engine::{Collaborators, LockupEngine};
pub use events::LedgerEvent;
pub use ledger::{compute_accrued, legacy_bridge_amount, settle, withdrawable_amount, Accrual, AccrualCase, Settlement};
pub use policy::{ConfiguredPolicy, DEFAULT_HOLDER_SHARE_BPS, DEFAULT_LOCKUP_DURATION, DEFAULT_MAX_EMISSION_RATE};
pub use registry::StaticRegistry;
pub use rewards::{split_since, RewardSplit};
pub use token::InMemoryToken;
