//! # Fixed-Point Ledger Arithmetic
//!
//! Balances, fees and rewards are integers in base units (10^8 base units
//! per coin). There is no floating point anywhere in a money path: every
//! operation is checked and either yields an exact integer or an error.
//!
//! Signed deltas (`i64`) describe balance changes in account merges. The
//! total supply (10^16) fits comfortably in both `u64` and `i64`.

use crate::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Base units per coin.
pub const FIXED_POINT: u64 = 100_000_000;

/// Total money supply in base units.
pub const TOTAL_AMOUNT: u64 = 10_000_000_000_000_000;

/// A non-negative quantity of base units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero base units.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a base-unit count.
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Whole coins to base units.
    pub const fn coins(coins: u64) -> Self {
        Self(coins * FIXED_POINT)
    }

    /// Raw base units.
    pub const fn units(self) -> u64 {
        self.0
    }

    /// `true` when zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> LedgerResult<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| LedgerError::Overflow(format!("{} + {}", self.0, other.0)))
    }

    /// Checked subtraction; fails when the result would be negative.
    pub fn checked_sub(self, other: Amount) -> LedgerResult<Amount> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| LedgerError::Overflow(format!("{} - {}", self.0, other.0)))
    }

    /// Checked multiplication by an integer factor.
    pub fn checked_mul(self, factor: u64) -> LedgerResult<Amount> {
        self.0
            .checked_mul(factor)
            .map(Amount)
            .ok_or_else(|| LedgerError::Overflow(format!("{} * {}", self.0, factor)))
    }

    /// Floor division and remainder by a non-zero divisor.
    pub fn div_rem(self, divisor: u64) -> LedgerResult<(Amount, Amount)> {
        if divisor == 0 {
            return Err(LedgerError::Overflow(format!("{} / 0", self.0)));
        }
        Ok((Amount(self.0 / divisor), Amount(self.0 % divisor)))
    }

    /// Apply a signed delta, returning `None` if the result is negative or
    /// overflows.
    pub fn checked_apply(self, delta: i64) -> Option<Amount> {
        self.0.checked_add_signed(delta).map(Amount)
    }

    /// This amount as a positive delta.
    pub fn as_delta(self) -> LedgerResult<i64> {
        i64::try_from(self.0).map_err(|_| LedgerError::Overflow(format!("{} as delta", self.0)))
    }

    /// This amount as a negative delta.
    pub fn as_negative_delta(self) -> LedgerResult<i64> {
        self.as_delta().map(|d| -d)
    }

    /// Parse a plain integer string.
    ///
    /// Rejects fractions, exponent notation, signs and anything that is not
    /// a run of ASCII digits.
    pub fn parse_strict(s: &str) -> LedgerResult<Amount> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidAmount(s.to_string()));
        }
        s.parse::<u64>()
            .map(Amount)
            .map_err(|_| LedgerError::InvalidAmount(s.to_string()))
    }

    /// Parse a decimal aggregate (e.g. a SQL `SUM`) and truncate toward zero.
    ///
    /// `"102.9"` becomes `102`. Negative values are rejected.
    pub fn floor_from_decimal(s: &str) -> LedgerResult<Amount> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::InvalidAmount(s.to_string()));
        }
        if whole.is_empty() {
            return if fraction.is_empty() {
                Err(LedgerError::InvalidAmount(s.to_string()))
            } else {
                Ok(Amount::ZERO)
            };
        }
        Self::parse_strict(whole)
    }

    /// Human-scaled value (coins), e.g. `1000000050` → `"10.0000005"`.
    pub fn to_human(self) -> String {
        let whole = self.0 / FIXED_POINT;
        let fraction = self.0 % FIXED_POINT;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{:08}", fraction);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl Sum for Amount {
    /// Saturating sum; callers summing untrusted input use `checked_add`.
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| Amount(acc.0.saturating_add(a.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::new(100);
        let b = Amount::new(10);
        assert_eq!(a.checked_add(b).unwrap(), Amount::new(110));
        assert_eq!(a.checked_sub(b).unwrap(), Amount::new(90));
        assert!(b.checked_sub(a).is_err());
        assert!(Amount::new(u64::MAX).checked_add(Amount::new(1)).is_err());
    }

    #[test]
    fn test_apply_delta() {
        let balance = Amount::new(10_000_000);
        assert_eq!(balance.checked_apply(-110), Some(Amount::new(9_999_890)));
        assert_eq!(Amount::new(5).checked_apply(-6), None);
    }

    #[test]
    fn test_div_rem() {
        let (share, rest) = Amount::new(102).div_rem(101).unwrap();
        assert_eq!(share, Amount::new(1));
        assert_eq!(rest, Amount::new(1));
        assert!(Amount::new(1).div_rem(0).is_err());
    }

    #[test]
    fn test_parse_strict_rejects_non_integers() {
        assert_eq!(Amount::parse_strict("12345").unwrap(), Amount::new(12345));
        assert!(Amount::parse_strict("1.5").is_err());
        assert!(Amount::parse_strict("1e8").is_err());
        assert!(Amount::parse_strict("-1").is_err());
        assert!(Amount::parse_strict("").is_err());
    }

    #[test]
    fn test_floor_from_decimal() {
        assert_eq!(Amount::floor_from_decimal("102.9").unwrap(), Amount::new(102));
        assert_eq!(Amount::floor_from_decimal("102").unwrap(), Amount::new(102));
        assert_eq!(Amount::floor_from_decimal("0.99").unwrap(), Amount::ZERO);
        assert!(Amount::floor_from_decimal("-3.2").is_err());
        assert!(Amount::floor_from_decimal("1.2e3").is_err());
    }

    #[test]
    fn test_human_scaling() {
        assert_eq!(Amount::new(1_000_000_050).to_human(), "10.0000005");
        assert_eq!(Amount::coins(25).to_human(), "25");
        assert_eq!(Amount::new(10_000_000).to_human(), "0.1");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_credit_then_debit_is_identity(
                start in 0u64..=TOTAL_AMOUNT,
                delta in 0i64..=1_000_000_000_000,
            ) {
                let credited = Amount::new(start).checked_apply(delta).unwrap();
                prop_assert_eq!(credited.checked_apply(-delta), Some(Amount::new(start)));
            }
        }
    }
}
