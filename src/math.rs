// src/math.rs

use core::fmt;

use crate::error::{CurveError, Result};
use crate::types::Amount;

// The macro expands plain two-parameter `Result`s, so it lives apart from the alias.
mod wide {
    use uint::construct_uint;

    construct_uint! {
        /// Minimal fixed-width 256-bit integer used for precise intermediate math.
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Fixed basis-point denominator: 10_000 bps = 100.00%.
pub const GRANULARITY: u16 = 10_000;

/// Fixed-point base of [`Decimal`] (18 decimals).
pub const WAD: u128 = 1_000_000_000_000_000_000;

pub(crate) fn mul_u256(a: U256, b: U256) -> Result<U256> {
    let (res, overflow) = a.overflowing_mul(b);
    if overflow {
        Err(CurveError::Overflow)
    } else {
        Ok(res)
    }
}

pub(crate) fn narrow_u256(value: U256) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        Err(CurveError::Overflow)
    } else {
        Ok(value.as_u128())
    }
}

/// `floor(a * b / d)` without intermediate overflow.
pub fn mul_div(a: Amount, b: Amount, d: Amount) -> Result<Amount> {
    if d == 0 {
        return Err(CurveError::Overflow);
    }
    narrow_u256(mul_u256(U256::from(a), U256::from(b))? / U256::from(d))
}

/// Shared bound check for every basis-point parameter (buffer, discount).
pub fn validate_basis_points(value: u16) -> Result<u16> {
    if value >= GRANULARITY {
        Err(CurveError::InvalidBasisPoints { value })
    } else {
        Ok(value)
    }
}

/// Unsigned 18-decimal fixed-point number.
///
/// Products are kept exact until [`Decimal::truncate`] floors them back to
/// an integer amount, so a sum of two priced segments rounds only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Decimal(U256);

impl Decimal {
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn one() -> Self {
        Self(U256::from(WAD))
    }

    pub fn from_integer(value: Amount) -> Self {
        // u128 * 10^18 always fits in 256 bits.
        Self(U256::from(value) * U256::from(WAD))
    }

    /// Wraps an already-scaled raw value (`value / 10^18`).
    pub fn from_raw(raw: Amount) -> Self {
        Self(U256::from(raw))
    }

    /// `num / den`, truncated to 18 decimals.
    pub fn ratio(num: Amount, den: Amount) -> Result<Self> {
        if den == 0 {
            return Err(CurveError::Overflow);
        }
        let scaled = mul_u256(U256::from(num), U256::from(WAD))?;
        Ok(Self(scaled / U256::from(den)))
    }

    /// `1 / self`, truncated to 18 decimals.
    pub fn reciprocal(self) -> Result<Self> {
        if self.0.is_zero() {
            return Err(CurveError::Overflow);
        }
        let one_sq = U256::from(WAD) * U256::from(WAD);
        Ok(Self(one_sq / self.0))
    }

    pub fn mul(self, other: Decimal) -> Result<Self> {
        Ok(Self(mul_u256(self.0, other.0)? / U256::from(WAD)))
    }

    /// Exact product with an integer amount (no truncation).
    pub fn mul_amount(self, amount: Amount) -> Result<Self> {
        Ok(Self(mul_u256(self.0, U256::from(amount))?))
    }

    /// `amount / self`, floored to an integer amount.
    pub fn quotient(self, amount: Amount) -> Result<Amount> {
        if self.0.is_zero() {
            return Err(CurveError::Overflow);
        }
        let scaled = mul_u256(U256::from(amount), U256::from(WAD))?;
        narrow_u256(scaled / self.0)
    }

    pub fn checked_add(self, other: Decimal) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(CurveError::Overflow)
    }

    /// Floors to an integer amount.
    pub fn truncate(self) -> Result<Amount> {
        narrow_u256(self.0 / U256::from(WAD))
    }

    /// Raw scaled value (`self * 10^18`).
    pub fn raw(self) -> Result<Amount> {
        narrow_u256(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wad = U256::from(WAD);
        let int = self.0 / wad;
        let frac = (self.0 % wad).as_u128();
        write!(f, "{}.{:018}", int, frac)
    }
}

impl core::str::FromStr for Decimal {
    type Err = CurveError;

    /// Parses `"500"` or `"1.0101"` (at most 18 fractional digits).
    fn from_str(s: &str) -> Result<Self> {
        let bad = || CurveError::InvalidConfig(format!("invalid decimal: {:?}", s));
        let (int, frac) = match s.trim().split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (s.trim(), ""),
        };
        if int.is_empty() || frac.len() > 18 {
            return Err(bad());
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let int: Amount = int.parse().map_err(|_| bad())?;
        let frac_raw: Amount = if frac.is_empty() {
            0
        } else {
            format!("{:0<18}", frac).parse().map_err(|_| bad())?
        };
        Decimal::from_integer(int).checked_add(Decimal::from_raw(frac_raw))
    }
}
