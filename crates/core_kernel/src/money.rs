//! Fee amounts with precise decimal arithmetic
//!
//! Amounts are carried as `rust_decimal::Decimal`. Values read from storage
//! may arrive as JSON numbers or as numeric strings; [`RawAmount`] converts
//! either form and refuses anything that is not a number, so a bookkeeping
//! bug surfaces as an error instead of a silent zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places used when presenting fee amounts
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur during amount handling
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A stored amount as it was read, before conversion to `Decimal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    /// Converts the stored value into a decimal amount
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` if the value is not numeric
    pub fn to_decimal(&self) -> Result<Decimal, MoneyError> {
        match self {
            RawAmount::Number(n) => parse_amount(&n.to_string()),
            RawAmount::Text(s) => parse_amount(s),
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{}", n),
            RawAmount::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Parses a numeric string into a decimal amount
///
/// Accepts plain (`"2500.50"`) and scientific (`"2.5e3"`) notation,
/// surrounded by optional whitespace.
///
/// # Example
///
/// ```rust
/// use core_kernel::money::parse_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_amount(" 2500.50 ").unwrap(), dec!(2500.50));
/// assert!(parse_amount("n/a").is_err());
/// ```
pub fn parse_amount(raw: &str) -> Result<Decimal, MoneyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MoneyError::InvalidAmount("empty value".to_string()));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| MoneyError::InvalidAmount(trimmed.to_string()))
}

/// Sums amounts, failing instead of wrapping on overflow
pub fn checked_sum<I>(amounts: I) -> Result<Decimal, MoneyError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or(MoneyError::Overflow)
}

/// Floors an amount at zero
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Rounds to presentation precision using banker's rounding
pub fn round_to_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        CURRENCY_DECIMAL_PLACES,
        rust_decimal::RoundingStrategy::MidpointNearestEven,
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parse_amount_roundtrips_display(mantissa in -1_000_000_000i64..1_000_000_000i64, scale in 0u32..4u32) {
            let value = Decimal::new(mantissa, scale);
            prop_assert_eq!(parse_amount(&value.to_string()).unwrap(), value);
        }

        #[test]
        fn checked_sum_matches_iterator_sum(values in proptest::collection::vec(-1_000_000i64..1_000_000i64, 0..50)) {
            let decimals: Vec<Decimal> = values.iter().map(|v| Decimal::new(*v, 2)).collect();
            let expected: Decimal = decimals.iter().sum();
            prop_assert_eq!(checked_sum(decimals).unwrap(), expected);
        }
    }
}
