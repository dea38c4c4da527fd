// crates/lockup-store/src/lib.rs
//
// lockup-store: Storage layer for the Lockup staking ledger.
//
// Provides an in-memory `LedgerStore` for tests and embedding, a
// RocksDB-backed `LedgerStore` for persistence, the `StagedLedger` overlay
// that buffers one operation's writes until it succeeds, and a token balance
// book persisted next to the ledger records.

pub mod memory;
pub mod rocks;
pub mod staged;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use staged::StagedLedger;
pub use token::RocksToken;
