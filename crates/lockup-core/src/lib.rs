// crates/lockup-core/src/lib.rs
//
// lockup-core: Core types, fixed-point math, ledger records, and trait
// interfaces for the Lockup staking and reward-distribution ledger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// All token amounts are integers in the token's smallest unit; fractions are
// carried by the `Decimal` fixed-point type (scale 10^18, floor rounding).

pub mod batch;
pub mod decimal;
pub mod error;
pub mod records;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use lockup_core::StakePosition;`

pub use batch::LedgerBatch;
pub use decimal::{mul_div, Decimal, BASIS, U256};
pub use error::LockupError;
pub use records::{GlobalEmissionState, PoolAccumulatorEntry, PositionStatus, StakePosition};
pub use traits::{Clock, EmissionPolicy, FungibleToken, LedgerStore, LedgerView, PoolRegistry};
pub use types::{Address, Amount, PoolKey, TimeIndex};
