// 🪙 Currency Catalog - the known-currency set behind the money factory
//
// Problem solved:
// - "USD" → a registered Currency
// - unknown codes fail explicitly instead of through dynamic dispatch

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::value::{Money, MoneyError};

// ============================================================================
// CURRENCY
// ============================================================================

/// One ISO 4217 currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// Three-letter ISO code, uppercase (e.g. "USD")
    iso_code: String,
}

impl Currency {
    pub fn new(iso_code: impl Into<String>) -> Self {
        Currency {
            iso_code: iso_code.into(),
        }
    }

    pub fn iso_code(&self) -> &str {
        &self.iso_code
    }
}

// ============================================================================
// CURRENCY REGISTRY
// ============================================================================

/// Catalog of currencies the money factory accepts.
///
/// Lookups are exact: ISO codes are stored and matched uppercase, so a raw
/// `"usd"` is rejected rather than silently normalized. That keeps a
/// decode → encode cycle code-for-code identical.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    currencies: HashMap<String, Currency>,
}

impl CurrencyRegistry {
    /// Create an empty registry (no currency is accepted until registered)
    pub fn empty() -> Self {
        CurrencyRegistry {
            currencies: HashMap::new(),
        }
    }

    /// Create a registry seeded with the common ISO 4217 currencies
    pub fn iso4217() -> Self {
        let mut registry = CurrencyRegistry::empty();
        registry.register_default_currencies();
        registry
    }

    fn register_default_currencies(&mut self) {
        const DEFAULTS: &[&str] = &[
            "AUD", "BRL", "CAD", "CHF", "CLP", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF",
            "INR", "JPY", "KRW", "KWD", "MXN", "NOK", "NZD", "PLN", "SEK", "SGD", "TRY", "USD",
            "ZAR",
        ];

        for code in DEFAULTS {
            self.register(Currency::new(*code));
        }
    }

    /// Register (or replace) a currency
    pub fn register(&mut self, currency: Currency) {
        self.currencies.insert(currency.iso_code.clone(), currency);
    }

    /// Look up a currency by exact ISO code
    pub fn get(&self, iso_code: &str) -> Option<&Currency> {
        self.currencies.get(iso_code)
    }

    pub fn contains(&self, iso_code: &str) -> bool {
        self.currencies.contains_key(iso_code)
    }

    /// All registered ISO codes, sorted
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.currencies.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn count(&self) -> usize {
        self.currencies.len()
    }

    /// Money factory indexed by currency code.
    ///
    /// The amount must be written in canonical decimal form: its scale is kept
    /// ("25.00" stays "25.00"), and anything the decimal would print back
    /// differently ("+5", "007.50", ".5", "1_000", more than 28 fractional
    /// digits) is rejected instead of being rounded or rewritten.
    pub fn money(&self, iso_code: &str, amount: &str) -> Result<Money, MoneyError> {
        let currency = self
            .get(iso_code)
            .ok_or_else(|| MoneyError::UnknownCurrency(iso_code.to_string()))?;

        let invalid = || MoneyError::InvalidAmount(amount.to_string());
        let parsed = Decimal::from_str(amount).map_err(|_| invalid())?;
        if parsed.to_string() != amount {
            return Err(invalid());
        }

        Ok(Money::new(parsed, currency.clone()))
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::iso4217()
    }
}

// ============================================================================
// TESTS
// ============================================================================
