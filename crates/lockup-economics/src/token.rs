// crates/lockup-economics/src/token.rs
//
// In-memory mintable token and amount formatting.
//
// The ledger only needs three things from a token: mint rewards, move staked
// tokens into and out of a pool's escrow, and report balances. Amounts are
// integers in the smallest unit; 1 token = 10^18 units.

use std::collections::HashMap;
use std::sync::RwLock;

use lockup_core::error::LockupError;
use lockup_core::{Address, Amount, FungibleToken};

/// Number of smallest units in one whole token.
pub const UNITS_PER_TOKEN: Amount = 1_000_000_000_000_000_000;

/// Decimal digits of the smallest unit.
const TOKEN_DECIMALS: usize = 18;

/// Render an amount of smallest units as whole tokens, trimming trailing zeros.
///
/// # Example
/// ```
/// use lockup_economics::token::format_units;
/// assert_eq!(format_units(1_500_000_000_000_000_000), "1.5");
/// ```
pub fn format_units(amount: Amount) -> String {
    let whole = amount / UNITS_PER_TOKEN;
    let frac = amount % UNITS_PER_TOKEN;
    if frac == 0 {
        whole.to_string()
    } else {
        let frac_str = format!("{:0width$}", frac, width = TOKEN_DECIMALS);
        format!("{}.{}", whole, frac_str.trim_end_matches('0'))
    }
}

#[derive(Debug, Default)]
struct Book {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

/// `FungibleToken` held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryToken {
    book: RwLock<Book>,
    /// Minting beyond this total is rejected. `None` means uncapped.
    max_supply: Option<Amount>,
}

impl InMemoryToken {
    /// Create an uncapped token with no balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token whose total supply may never exceed `max_supply`.
    pub fn with_max_supply(max_supply: Amount) -> Self {
        Self {
            book: RwLock::new(Book::default()),
            max_supply: Some(max_supply),
        }
    }

    pub fn total_supply(&self) -> Result<Amount, LockupError> {
        Ok(self.read()?.total_supply)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Book>, LockupError> {
        self.book
            .read()
            .map_err(|_| LockupError::ExternalCapability("token book lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Book>, LockupError> {
        self.book
            .write()
            .map_err(|_| LockupError::ExternalCapability("token book lock poisoned".to_string()))
    }
}

impl FungibleToken for InMemoryToken {
    fn mint(&self, to: &Address, amount: Amount) -> Result<(), LockupError> {
        let mut book = self.write()?;
        let new_supply = book
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| LockupError::ExternalCapability("token supply overflow".to_string()))?;
        if let Some(cap) = self.max_supply {
            if new_supply > cap {
                return Err(LockupError::ExternalCapability(format!(
                    "mint of {} would exceed max supply {} (current supply {})",
                    amount, cap, book.total_supply
                )));
            }
        }
        book.total_supply = new_supply;
        let balance = book.balances.entry(*to).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), LockupError> {
        let mut book = self.write()?;
        let from_balance = book.balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(LockupError::ExternalCapability(format!(
                "insufficient balance: {} holds {} but {} was requested",
                from, from_balance, amount
            )));
        }
        book.balances.insert(*from, from_balance - amount);
        let to_balance = book.balances.entry(*to).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);
        Ok(())
    }

    fn burn(&self, from: &Address, amount: Amount) -> Result<(), LockupError> {
        let mut book = self.write()?;
        let balance = book.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(LockupError::ExternalCapability(format!(
                "cannot burn {} from {}: balance is {}",
                amount, from, balance
            )));
        }
        book.balances.insert(*from, balance - amount);
        book.total_supply = book.total_supply.saturating_sub(amount);
        Ok(())
    }

    fn balance_of(&self, owner: &Address) -> Result<Amount, LockupError> {
        Ok(self.read()?.balances.get(owner).copied().unwrap_or(0))
    }
}
