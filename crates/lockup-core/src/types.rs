// crates/lockup-core/src/types.rs
//
// Identifiers and scalar aliases shared by every crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LockupError;

/// Token amount in the smallest unit.
pub type Amount = u128;

/// Monotonic time index supplied by the host (block height).
pub type TimeIndex = u64;

/// A 20-byte account or pool address, rendered as `0x`-prefixed hex.
///
/// Pools and stakers share the same address space: a pool's address doubles
/// as the escrow account that holds its staked tokens.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// An address with every byte set to `byte`. Handy in tests and fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Address([byte; 20])
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = LockupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| LockupError::InvalidArgument(format!("address {:?} is not hex: {}", s, e)))?;
        let array: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            LockupError::InvalidArgument(format!(
                "address {:?} has {} bytes, expected 20",
                s,
                b.len()
            ))
        })?;
        Ok(Address(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Key of a pool accumulator entry.
///
/// `All` is the reserved sentinel for the protocol-wide aggregate; its
/// stake unit is always the sum of every per-pool unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PoolKey {
    All,
    Pool(Address),
}

impl PoolKey {
    /// Compact tag used in storage keys: `all` or the pool's hex address.
    pub fn storage_tag(&self) -> String {
        match self {
            PoolKey::All => "all".to_string(),
            PoolKey::Pool(address) => address.to_hex(),
        }
    }
}

impl From<Address> for PoolKey {
    fn from(address: Address) -> Self {
        PoolKey::Pool(address)
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKey::All => f.write_str("all pools"),
            PoolKey::Pool(address) => write!(f, "pool {}", address),
        }
    }
}
