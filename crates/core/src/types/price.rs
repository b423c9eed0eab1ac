//! Type-safe price representation using decimal arithmetic.
//!
//! The remote store prices everything in Egyptian pounds and sends amounts
//! as JSON numbers. Converting those to `Decimal` once, at the edge, keeps
//! subtotals exact (`0.1 + 0.2` style drift never reaches the cart).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quantity;

/// A monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// ISO 4217 code of the store currency.
    pub const CURRENCY: &'static str = "EGP";

    /// Zero in the store currency.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Parse a price from its textual form (e.g. `"149.5"`).
    ///
    /// Returns `None` when the text is not a decimal number.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Decimal::from_str(text.trim()).ok().map(Self)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Saturates at the largest representable amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Price of `quantity` units, or `None` on overflow.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two prices, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Price of a positive [`Quantity`] at this unit price.
    #[must_use]
    pub fn times_quantity(self, quantity: Quantity) -> Self {
        self.times(quantity.get())
    }

    /// Format with the currency code (e.g. `"EGP 20.00"`).
    #[must_use]
    pub fn display_with_currency(&self) -> String {
        format!("{} {self}", Self::CURRENCY)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

/// Saturating; use [`Price::checked_add`] where overflow must be detected.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_units(20).to_string(), "20.00");
        assert_eq!(Price::parse("149.5").unwrap().to_string(), "149.50");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::from_units(10).times(2), Price::from_units(20));
        assert_eq!(Price::from_units(10).times(0), Price::ZERO);
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Price = ["0.1", "0.2"]
            .iter()
            .map(|s| Price::parse(s).unwrap())
            .sum();
        assert_eq!(total, Price::parse("0.3").unwrap());
    }

    #[test]
    fn test_overflow_is_detected_or_saturates() {
        let max = Price::new(Decimal::MAX);
        assert_eq!(max.checked_times(2), None);
        assert_eq!(max.checked_add(Price::from_units(1)), None);
        assert_eq!(
            Price::from_units(10).checked_times(3),
            Some(Price::from_units(30))
        );
        assert_eq!(max.times(2), max);
        assert_eq!([max, max].into_iter().sum::<Price>(), max);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Price::parse("twelve").is_none());
        assert!(Price::parse("").is_none());
    }

    #[test]
    fn test_display_with_currency() {
        assert_eq!(Price::from_units(5).display_with_currency(), "EGP 5.00");
    }
}
