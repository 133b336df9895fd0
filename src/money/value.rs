//! Immutable money value: an exact decimal amount tagged with its currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::currency::Currency;

/// Failures of the money factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("unknown currency code `{0}`")]
    UnknownCurrency(String),

    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
}

/// A monetary amount in one currency.
///
/// Construction goes through [`CurrencyRegistry::money`](super::CurrencyRegistry::money)
/// or [`Money::new`]; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Money { amount, currency }
    }

    pub fn amount(&self) -> &Decimal {
        &self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Exact decimal string, trailing zeros included ("25.00").
    pub fn amount_as_string(&self) -> String {
        self.amount.to_string()
    }

    pub fn currency_iso_code(&self) -> &str {
        self.currency.iso_code()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency.iso_code())
    }
}
