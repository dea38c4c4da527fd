// crates/lockup-core/src/decimal.rs
//
// Fixed-point arithmetic for reward accounting.
//
// `Decimal` is an unsigned fraction scaled by BASIS = 10^18. Every product or
// quotient is evaluated in 256 bits and rounded toward zero; a result that
// does not fit back into 128 bits is an error, never a wrapped value.

// Allow clippy warnings from the uint crate's construct_uint macro
#![allow(clippy::manual_div_ceil)]
#![allow(clippy::assign_op_pattern)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uint::construct_uint;

use crate::error::LockupError;
use crate::types::Amount;

construct_uint! {
    /// 256-bit unsigned integer used for intermediate products.
    pub struct U256(4);
}

/// Fixed-point scale: 10^18.
pub const BASIS: u128 = 1_000_000_000_000_000_000;

/// Number of fractional decimal digits carried by `Decimal`.
const BASIS_DIGITS: usize = 18;

fn widen(value: u128) -> U256 {
    U256([value as u64, (value >> 64) as u64, 0, 0])
}

fn narrow(value: U256, what: &str) -> Result<u128, LockupError> {
    if value.0[2] != 0 || value.0[3] != 0 {
        return Err(LockupError::overflow(what));
    }
    Ok(((value.0[1] as u128) << 64) | value.0[0] as u128)
}

/// Compute `floor(a * b / c)` without intermediate overflow.
///
/// # Errors
/// `InvalidArgument` if `c == 0`, `Overflow` if the quotient exceeds `u128`.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128, LockupError> {
    if c == 0 {
        return Err(LockupError::InvalidArgument(
            "mul_div divisor is zero".to_string(),
        ));
    }
    // Two 128-bit factors always fit in 256 bits.
    let product = widen(a) * widen(b);
    narrow(product / widen(c), "mul_div quotient")
}

/// Unsigned fixed-point fraction with scale `BASIS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decimal(u128);

impl Decimal {
    pub const ZERO: Decimal = Decimal(0);
    pub const ONE: Decimal = Decimal(BASIS);

    /// Wrap an already-scaled raw value.
    pub const fn from_raw(raw: u128) -> Self {
        Decimal(raw)
    }

    /// The raw scaled value.
    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// `floor(num / den)` as a fraction. A zero denominator yields zero.
    pub fn ratio(num: Amount, den: Amount) -> Result<Self, LockupError> {
        if den == 0 {
            return Ok(Decimal::ZERO);
        }
        mul_div(num, BASIS, den).map(Decimal)
    }

    /// Apply this fraction to an amount: `floor(amount * self)`.
    pub fn mul_amount(&self, amount: Amount) -> Result<Amount, LockupError> {
        mul_div(amount, self.0, BASIS)
    }

    pub fn checked_add(self, other: Decimal) -> Result<Self, LockupError> {
        self.0
            .checked_add(other.0)
            .map(Decimal)
            .ok_or_else(|| LockupError::overflow("decimal sum"))
    }

    pub fn saturating_sub(self, other: Decimal) -> Self {
        Decimal(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASIS;
        let frac = self.0 % BASIS;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac_str = format!("{:0width$}", frac, width = BASIS_DIGITS);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

impl FromStr for Decimal {
    type Err = LockupError;

    /// Parse `"3"`, `"0.25"` or `"1.5"`. At most 18 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LockupError::InvalidArgument(format!("invalid decimal: {:?}", s));
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() || frac.len() > BASIS_DIGITS {
            return Err(invalid());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u128 = whole.parse().map_err(|_| invalid())?;
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac, width = BASIS_DIGITS)
                .parse()
                .map_err(|_| invalid())?
        };
        whole
            .checked_mul(BASIS)
            .and_then(|raw| raw.checked_add(frac_raw))
            .map(Decimal)
            .ok_or_else(|| LockupError::overflow("decimal literal"))
    }
}
