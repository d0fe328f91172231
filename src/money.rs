//! Money Module
//!
//! Exact decimal money at a fixed scale of 2 fraction digits. Every value that
//! enters the system (card balances, transaction amounts, configured initial
//! balances) goes through [`Money::of`] so that comparison and arithmetic
//! always happen on the rounded value.
//!
//! ## Rounding
//! Normalization uses banker's rounding (round-half-to-even):
//! - `100.005` → `100.00` (0 is even)
//! - `100.015` → `100.02`
//! - `100.0051` → `100.01` (not a midpoint)
//!
//! ## Usage
//! ```rust
//! use card_authorizer::money::Money;
//!
//! let balance: Money = "500.00".parse().unwrap();
//! let amount: Money = "100.005".parse().unwrap();
//! assert_eq!(balance.subtract(&amount).unwrap().to_string(), "400.00");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Money errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Result would be negative: {minuend} - {subtrahend}")]
    InsufficientMagnitude { minuend: Money, subtrahend: Money },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Amount too large, would overflow")]
    Overflow,
}

// ============================================================================
// Money
// ============================================================================

/// Exact monetary amount, always held at scale 2.
///
/// The type itself allows negative values: a submitted transaction amount may
/// be negative and must still be comparable so the authorization rules can
/// reject it. Stored balances are kept non-negative by those rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Fraction digits carried by every `Money`
    pub const SCALE: u32 = 2;

    /// Normalize a decimal to 2 digits with round-half-to-even.
    pub fn of(value: Decimal) -> Self {
        let mut rounded =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointNearestEven);
        // round_dp never increases the scale, so "5" stays "5" without this
        rounded.rescale(Self::SCALE);
        if rounded.is_zero() {
            // -0.00 and 0.00 compare equal but print differently
            rounded.set_sign_positive(true);
        }
        Money(rounded)
    }

    pub fn zero() -> Self {
        Money::from_cents(0)
    }

    /// Build from an integer number of cents
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, Self::SCALE))
    }

    /// The scaled decimal value
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// `self - other`, refusing to produce a negative result.
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        let result = self.0.checked_sub(other.0).ok_or(MoneyError::Overflow)?;
        if result.is_sign_negative() && !result.is_zero() {
            return Err(MoneyError::InsufficientMagnitude {
                minuend: *self,
                subtrahend: *other,
            });
        }
        Ok(Money::of(result))
    }

    pub fn is_greater_than(&self, other: &Money) -> bool {
        self.0 > other.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::of(value)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Parse a plain decimal string (`"500"`, `"100.005"`, `"-1.5"`).
    ///
    /// Scientific notation and thousands separators are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if s.contains(['e', 'E']) {
            return Err(MoneyError::InvalidFormat(
                "scientific notation not allowed".into(),
            ));
        }
        if s.contains(',') {
            return Err(MoneyError::InvalidFormat(
                "thousands separators not allowed".into(),
            ));
        }

        Decimal::from_str(s)
            .map(Money::of)
            .map_err(|e| MoneyError::InvalidFormat(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Always a string: "500.00", never a float
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_of_rounds_half_to_even() {
        assert_eq!(money("100.005").to_string(), "100.00");
        assert_eq!(money("100.015").to_string(), "100.02");
        assert_eq!(money("100.025").to_string(), "100.02");
        assert_eq!(money("100.0051").to_string(), "100.01");
        assert_eq!(money("0.125").to_string(), "0.12");
        assert_eq!(money("-0.125").to_string(), "-0.12");
    }

    #[test]
    fn test_of_always_scale_two() {
        assert_eq!(money("500").to_string(), "500.00");
        assert_eq!(money("500").amount().scale(), 2);
        assert_eq!(money("0.1").to_string(), "0.10");
        assert_eq!(Money::of(Decimal::new(12345, 4)).amount().scale(), 2);
    }

    #[test]
    fn test_negative_zero_normalizes() {
        let m = money("-0.001");
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert_eq!(m.to_string(), "0.00");
    }

    #[test]
    fn test_subtract() {
        assert_eq!(
            money("500.00").subtract(&money("100.005")).unwrap(),
            money("400.00")
        );
        assert_eq!(
            money("500.00").subtract(&money("500.00")).unwrap(),
            Money::zero()
        );

        let err = money("0.00").subtract(&money("0.01")).unwrap_err();
        assert!(matches!(err, MoneyError::InsufficientMagnitude { .. }));
    }

    #[test]
    fn test_comparisons_on_rounded_value() {
        // 200.005 rounds down to 200.00, so it is not greater than a 200.00 balance
        assert!(!money("200.005").is_greater_than(&money("200.00")));
        assert!(money("200.015").is_greater_than(&money("200.01")));
        assert!(money("-1").is_negative());
        assert!(money("0.004").is_zero());
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(50_000).to_string(), "500.00");
        assert_eq!(Money::from_cents(1), money("0.01"));
    }

    #[test]
    fn test_parse_rejects_bad_formats() {
        for case in ["", "   ", "1e2", "1,000.00", "abc", "1.2.3"] {
            assert!(case.parse::<Money>().is_err(), "should reject {:?}", case);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&money("12.3")).unwrap();
        assert_eq!(json, r#""12.30""#);

        let back: Money = serde_json::from_str(r#""12.345""#).unwrap();
        assert_eq!(back, money("12.34"));
    }
}
