// crates/lockup-store/src/token.rs
//
// Token balance book persisted in the ledger's RocksDB.
//
// Balances live under `balance:{hex}` and the minted total under `supply`.
// Each mint or transfer writes its updated amounts in one WriteBatch.

use std::sync::{Arc, Mutex};

use lockup_core::error::LockupError;
use lockup_core::{Address, Amount, FungibleToken};

use crate::rocks::RocksStore;

/// `FungibleToken` backed by a shared `RocksStore`.
pub struct RocksToken {
    store: Arc<RocksStore>,
    /// Minting beyond this total is rejected. `None` means uncapped.
    max_supply: Option<Amount>,
    /// Serializes read-modify-write cycles on balances.
    write_lock: Mutex<()>,
}

impl RocksToken {
    pub fn new(store: Arc<RocksStore>, max_supply: Option<Amount>) -> Self {
        Self {
            store,
            max_supply,
            write_lock: Mutex::new(()),
        }
    }

    /// Total amount minted so far.
    pub fn total_supply(&self) -> Result<Amount, LockupError> {
        self.store.get_amount(&RocksStore::supply_key())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, LockupError> {
        self.write_lock
            .lock()
            .map_err(|_| LockupError::Storage("token book lock poisoned".to_string()))
    }
}

impl FungibleToken for RocksToken {
    fn mint(&self, to: &Address, amount: Amount) -> Result<(), LockupError> {
        let _guard = self.lock()?;
        let supply = self.total_supply()?;
        let new_supply = supply
            .checked_add(amount)
            .ok_or_else(|| LockupError::ExternalCapability("token supply overflow".to_string()))?;
        if let Some(cap) = self.max_supply {
            if new_supply > cap {
                return Err(LockupError::ExternalCapability(format!(
                    "mint of {} would exceed max supply {} (current supply {})",
                    amount, cap, supply
                )));
            }
        }
        let balance_key = RocksStore::balance_key(to);
        let balance = self.store.get_amount(&balance_key)?;
        self.store.put_amounts(&[
            (balance_key, balance.saturating_add(amount)),
            (RocksStore::supply_key(), new_supply),
        ])
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), LockupError> {
        let _guard = self.lock()?;
        if from == to {
            return Ok(());
        }
        let from_key = RocksStore::balance_key(from);
        let to_key = RocksStore::balance_key(to);
        let from_balance = self.store.get_amount(&from_key)?;
        if from_balance < amount {
            return Err(LockupError::ExternalCapability(format!(
                "insufficient balance: {} holds {} but {} was requested",
                from, from_balance, amount
            )));
        }
        let to_balance = self.store.get_amount(&to_key)?;
        self.store.put_amounts(&[
            (from_key, from_balance - amount),
            (to_key, to_balance.saturating_add(amount)),
        ])
    }

    fn burn(&self, from: &Address, amount: Amount) -> Result<(), LockupError> {
        let _guard = self.lock()?;
        let balance_key = RocksStore::balance_key(from);
        let balance = self.store.get_amount(&balance_key)?;
        if balance < amount {
            return Err(LockupError::ExternalCapability(format!(
                "cannot burn {} from {}: balance is {}",
                amount, from, balance
            )));
        }
        let supply = self.total_supply()?;
        self.store.put_amounts(&[
            (balance_key, balance - amount),
            (RocksStore::supply_key(), supply.saturating_sub(amount)),
        ])
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount, LockupError> {
        self.store.get_amount(&RocksStore::balance_key(owner))
    }
}
