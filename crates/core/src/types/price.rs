//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog backend stores prices as display strings (`"$2,999.99"`) in
//! some collections and as plain numbers in others. Prices are normalized
//! into a [`Price`] exactly once, when a record enters the system, and are
//! never re-parsed downstream.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    #[error("price has no numeric content: {0:?}")]
    Empty(String),
    #[error("malformed price: {0:?}")]
    Malformed(String),
}

/// A non-negative unit price in the shop currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Parse a display-formatted price such as `"$2,999.99"` or `"1299"`.
    ///
    /// Every character other than an ASCII digit or `.` is stripped before
    /// parsing, so currency symbols, grouping commas and whitespace are
    /// ignored. A leading minus sign is stripped too, which means a display
    /// string can never yield a negative price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Empty` when nothing numeric remains and
    /// `PriceError::Malformed` when the remaining digits do not form a
    /// decimal (e.g. `"1.2.3"`).
    pub fn parse_display(raw: &str) -> Result<Self, PriceError> {
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if normalized.is_empty() {
            return Err(PriceError::Empty(raw.to_string()));
        }

        Decimal::from_str(&normalized)
            .map_err(|_| PriceError::Malformed(raw.to_string()))
            .and_then(Self::new)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount for `quantity` units of this price, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_display(s)
    }
}

/// Format any amount with a dollar sign and two decimals.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_times_saturates() {
        let price = Price::new(dec("10000000000000000000")).unwrap();
        assert_eq!(price.times(2), dec("20000000000000000000"));
        assert_eq!(price.times(u32::MAX), dec("42949672950000000000000000000"));

        let price = Price::new(dec("100000000000000000000")).unwrap();
        assert_eq!(price.times(u32::MAX), Decimal::MAX);
    }

    #[test]
    fn test_parse_display_strips_symbols_and_grouping() {
        let price = Price::parse_display("$2,999.99").unwrap();
        assert_eq!(price.amount(), dec("2999.99"));
    }

    #[test]
    fn test_parse_display_plain_number() {
        assert_eq!(Price::parse_display("1299").unwrap().amount(), dec("1299"));
    }

    #[test]
    fn test_parse_display_ignores_minus_sign() {
        assert_eq!(Price::parse_display("-15").unwrap().amount(), dec("15"));
    }

    #[test]
    fn test_parse_display_rejects_text_only() {
        assert!(matches!(
            Price::parse_display("consultar"),
            Err(PriceError::Empty(_))
        ));
    }

    #[test]
    fn test_parse_display_rejects_multiple_dots() {
        assert!(matches!(
            Price::parse_display("1.2.3"),
            Err(PriceError::Malformed(_))
        ));
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(Price::new(dec("-0.01")), Err(PriceError::Negative(_))));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_display_has_two_decimals() {
        assert_eq!(Price::new(dec("10")).unwrap().display(), "$10.00");
        assert_eq!(Price::new(dec("4.5")).unwrap().display(), "$4.50");
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::new(dec("2.5")).unwrap().times(3), dec("7.5"));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("\"-1\"").is_err());
        assert_eq!(
            serde_json::from_str::<Price>("\"12.30\"").unwrap().amount(),
            dec("12.30")
        );
    }
}
