// crates/lockup-store/src/rocks.rs
//
// RocksDB-backed persistent storage for ledger records.
//
// Key format:
//   - `emission`                          -> JSON GlobalEmissionState
//   - `pool:all` / `pool:{hex}`           -> JSON PoolAccumulatorEntry
//   - `position:{pool_hex}:{staker_hex}`  -> JSON StakePosition
//   - `balance:{hex}` / `supply`          -> JSON Amount (token book, see token.rs)
//
// A missing key decodes to the record's zero value. Batches are written
// with a single RocksDB WriteBatch, so they land atomically.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use serde::de::DeserializeOwned;
use serde::Serialize;

use lockup_core::error::LockupError;
use lockup_core::{
    Address, Amount, GlobalEmissionState, LedgerBatch, LedgerStore, LedgerView,
    PoolAccumulatorEntry, PoolKey, StakePosition,
};

const EMISSION_KEY: &[u8] = b"emission";
const SUPPLY_KEY: &[u8] = b"supply";

/// RocksDB wrapper implementing the `LedgerStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, LockupError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            LockupError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        Ok(Self { db })
    }

    /// Build the key for a pool accumulator entry: `pool:{tag}`.
    fn pool_key(key: &PoolKey) -> Vec<u8> {
        format!("pool:{}", key.storage_tag()).into_bytes()
    }

    /// Build the key for a stake position: `position:{pool}:{staker}`.
    fn position_key(pool: &Address, staker: &Address) -> Vec<u8> {
        format!("position:{}:{}", pool.to_hex(), staker.to_hex()).into_bytes()
    }

    /// Build the key for a token balance: `balance:{hex}`.
    pub(crate) fn balance_key(owner: &Address) -> Vec<u8> {
        format!("balance:{}", owner.to_hex()).into_bytes()
    }

    pub(crate) fn supply_key() -> Vec<u8> {
        SUPPLY_KEY.to_vec()
    }

    /// Get raw bytes from RocksDB, mapping errors to LockupError::Storage.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LockupError> {
        self.db
            .get(key)
            .map_err(|e| LockupError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Decode a JSON record, or its zero value if the key is absent.
    fn get_record<T: DeserializeOwned + Default>(&self, key: &[u8]) -> Result<T, LockupError> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(T::default()),
        }
    }

    fn stage<T: Serialize>(batch: &mut WriteBatch, key: &[u8], value: &T) -> Result<(), LockupError> {
        let json = serde_json::to_vec(value)?;
        batch.put(key, json);
        Ok(())
    }

    fn write(&self, batch: WriteBatch) -> Result<(), LockupError> {
        self.db
            .write(batch)
            .map_err(|e| LockupError::Storage(format!("RocksDB batch write failed: {}", e)))
    }

    /// Read an amount stored under `key` (zero if absent).
    pub(crate) fn get_amount(&self, key: &[u8]) -> Result<Amount, LockupError> {
        self.get_record(key)
    }

    /// Write several amounts in one atomic batch.
    pub(crate) fn put_amounts(&self, entries: &[(Vec<u8>, Amount)]) -> Result<(), LockupError> {
        let mut batch = WriteBatch::default();
        for (key, amount) in entries {
            Self::stage(&mut batch, key, amount)?;
        }
        self.write(batch)
    }
}

impl LedgerView for RocksStore {
    fn emission(&self) -> Result<GlobalEmissionState, LockupError> {
        self.get_record(EMISSION_KEY)
    }

    fn pool(&self, key: &PoolKey) -> Result<PoolAccumulatorEntry, LockupError> {
        self.get_record(&Self::pool_key(key))
    }

    fn position(&self, pool: &Address, staker: &Address) -> Result<StakePosition, LockupError> {
        self.get_record(&Self::position_key(pool, staker))
    }
}

impl LedgerStore for RocksStore {
    fn apply(&self, batch: LedgerBatch) -> Result<(), LockupError> {
        if batch.is_empty() {
            return Ok(());
        }
        let records = batch.len();
        let mut write = WriteBatch::default();
        if let Some(emission) = &batch.emission {
            Self::stage(&mut write, EMISSION_KEY, emission)?;
        }
        for (key, entry) in &batch.pools {
            Self::stage(&mut write, &Self::pool_key(key), entry)?;
        }
        for ((pool, staker), position) in &batch.positions {
            Self::stage(&mut write, &Self::position_key(pool, staker), position)?;
        }
        self.write(write)?;
        tracing::debug!(records, "Applied ledger batch to RocksDB");
        Ok(())
    }
}
