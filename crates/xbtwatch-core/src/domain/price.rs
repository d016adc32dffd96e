use std::fmt::{Display, Formatter};

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Quote-currency amount per unit of the base asset.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub const ZERO: Price = Price(0.0);
    /// Largest accepted price; keeps cent arithmetic exact in `u128`.
    pub const MAX_VALUE: f64 = 1e30;

    /// Validate a raw value: it must be finite, non-negative and at most [`Price::MAX_VALUE`].
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        validate_non_negative("price", value)?;
        if value > Self::MAX_VALUE {
            return Err(ValidationError::TooLarge { field: "price" });
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Absolute distance between two prices.
    pub fn distance(self, other: Price) -> f64 {
        (self.0 - other.0).abs()
    }

    /// Renders the price as `<symbol><thousands-separated integer>.<2 decimals>`,
    /// e.g. `€43,000.00`.
    pub fn format_with(self, currency_symbol: &str) -> String {
        let cents = (self.0 * 100.0).round() as u128;
        let whole = cents / 100;
        let fraction = cents % 100;
        format!(
            "{currency_symbol}{}.{fraction:02}",
            whole.to_formatted_string(&Locale::en)
        )
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Price {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

/// Direction word used in notification messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub const fn word(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.word())
    }
}

pub(crate) fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_non_negative(field, value)?;
    if value == 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        assert_eq!(
            Price::new(-1.0),
            Err(ValidationError::NegativeValue { field: "price" })
        );
        assert_eq!(
            Price::new(f64::NAN),
            Err(ValidationError::NonFiniteValue { field: "price" })
        );
        assert!(Price::new(0.0).is_ok());
    }

    #[test]
    fn formats_with_thousands_separator_and_cents() {
        let price = Price::new(43_000.0).expect("valid price");
        assert_eq!(price.format_with("€"), "€43,000.00");

        let price = Price::new(1_234_567.891).expect("valid price");
        assert_eq!(price.format_with("$"), "$1,234,567.89");

        let price = Price::new(0.5).expect("valid price");
        assert_eq!(price.format_with("€"), "€0.50");
    }

    #[test]
    fn large_prices_format_exactly_and_absurd_ones_are_rejected() {
        let price = Price::new(1e18).expect("valid price");
        assert_eq!(price.format_with("€"), "€1,000,000,000,000,000,000.00");

        assert_eq!(
            Price::new(1e31),
            Err(ValidationError::TooLarge { field: "price" })
        );
    }

    #[test]
    fn deserializes_through_validation() {
        let parsed: Price = serde_json::from_str("40251.5").expect("valid price json");
        assert_eq!(parsed.value(), 40_251.5);

        let rejected = serde_json::from_str::<Price>("-3");
        assert!(rejected.is_err());
    }
}
