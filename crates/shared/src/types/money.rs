//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major currency units (e.g., dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD", "MXN").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Canadian Dollar
    Cad,
    /// Mexican Peso
    Mxn,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Returns the amount in minor currency units (cents).
    ///
    /// All supported currencies use two decimal places. Returns `None` if
    /// the amount does not fit in an `i64` after scaling.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;
        (self.amount * Decimal::ONE_HUNDRED).round().to_i64()
    }
}

impl Currency {
    /// Returns the lowercase code the payment gateway expects.
    #[must_use]
    pub const fn gateway_code(&self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
            Self::Cad => "cad",
            Self::Mxn => "mxn",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
            Self::Cad => write!(f, "CAD"),
            Self::Mxn => write!(f, "MXN"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "CAD" => Ok(Self::Cad),
            "MXN" => Ok(Self::Mxn),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_new() {
        let amount = dec!(100.00);
        let money = Money::new(amount, Currency::Usd);
        assert_eq!(money.amount, amount);
        assert_eq!(money.currency, Currency::Usd);
    }

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Mxn);
        assert!(money.is_zero());
        assert_eq!(money.amount, Decimal::ZERO);
        assert_eq!(money.currency, Currency::Mxn);
    }

    #[test]
    fn test_money_is_negative() {
        let positive = Money::new(dec!(10), Currency::Usd);
        assert!(!positive.is_negative());

        let negative = Money::new(dec!(-10), Currency::Usd);
        assert!(negative.is_negative());

        let zero = Money::new(dec!(0), Currency::Usd);
        assert!(!zero.is_negative());
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::new(dec!(50.00), Currency::Usd).minor_units(), Some(5000));
        assert_eq!(Money::new(dec!(0.99), Currency::Usd).minor_units(), Some(99));
        assert_eq!(Money::new(dec!(10.505), Currency::Usd).minor_units(), Some(1050));
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert_eq!(Currency::Cad.to_string(), "CAD");
        assert_eq!(Currency::Mxn.to_string(), "MXN");
    }

    #[test]
    fn test_gateway_code() {
        assert_eq!(Currency::Usd.gateway_code(), "usd");
        assert_eq!(Currency::Mxn.gateway_code(), "mxn");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);
        assert_eq!(Currency::from_str("MXN").unwrap(), Currency::Mxn);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }
}
