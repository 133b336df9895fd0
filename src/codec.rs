// 🔁 Money Field Codec - raw (balance, currency) pair ⇄ composite Money
//
// Amounts cross this boundary as strings, never as floats.
// Neither direction mutates the attribute store: decode reads, encode returns
// the raw pair and the caller decides where it goes.
//
// Decode accepts a balance stored as Text, Integer or Decimal. Encode always
// produces Text, so a composite write normalizes a numeric balance column to
// its exact decimal string.

use std::sync::Arc;

use crate::attributes::{AttributeStore, AttributeValue};
use crate::config::FieldMapping;
use crate::error::DecodeError;
use crate::money::{CurrencyRegistry, Money, MoneyError};

/// Raw pair produced by [`MoneyFieldCodec::encode`]; both halves are text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMoney {
    pub balance: String,
    pub currency: String,
}

impl RawMoney {
    /// Write both raw fields named by `mapping` into `attrs`
    pub fn write_to(self, attrs: &mut AttributeStore, mapping: &FieldMapping) {
        attrs.set(mapping.balance_field(), self.balance);
        attrs.set(mapping.currency_field(), self.currency);
    }
}

#[derive(Debug, Clone)]
pub struct MoneyFieldCodec {
    currencies: Arc<CurrencyRegistry>,
}

impl MoneyFieldCodec {
    pub fn new(currencies: Arc<CurrencyRegistry>) -> Self {
        MoneyFieldCodec { currencies }
    }

    pub fn currencies(&self) -> &CurrencyRegistry {
        &self.currencies
    }

    /// Build the composite value from the raw fields named by `mapping`.
    ///
    /// Returns `Ok(None)` when both raw fields are absent or null; decoding is
    /// not attempted then. Exactly one of them filled is `PartialRawData`.
    pub fn decode(
        &self,
        attrs: &AttributeStore,
        mapping: &FieldMapping,
    ) -> Result<Option<Money>, DecodeError> {
        let balance = filled(attrs, mapping.balance_field());
        let currency = filled(attrs, mapping.currency_field());

        let (balance, currency) = match (balance, currency) {
            (None, None) => return Ok(None),
            (Some(balance), Some(currency)) => (balance, currency),
            (Some(_), None) => {
                return Err(partial(mapping, mapping.balance_field(), mapping.currency_field()))
            }
            (None, Some(_)) => {
                return Err(partial(mapping, mapping.currency_field(), mapping.balance_field()))
            }
        };

        let amount = balance_string(mapping.balance_field(), balance)?;
        let code = currency
            .as_text()
            .ok_or_else(|| DecodeError::UnsupportedRawType {
                field: mapping.currency_field().to_string(),
                found: currency.type_name(),
            })?;

        let money = self
            .currencies
            .money(code, &amount)
            .map_err(|err| match err {
                MoneyError::UnknownCurrency(code) => DecodeError::UnknownCurrency {
                    composite: mapping.composite_field().to_string(),
                    code,
                },
                MoneyError::InvalidAmount(amount) => DecodeError::InvalidAmount {
                    composite: mapping.composite_field().to_string(),
                    amount,
                },
            })?;

        tracing::trace!(
            composite = %mapping.composite_field(),
            money = %money,
            "decoded raw money fields"
        );

        Ok(Some(money))
    }

    /// Split a money value into its raw pair (exact amount string, ISO code)
    pub fn encode(&self, value: &Money) -> RawMoney {
        RawMoney {
            balance: value.amount_as_string(),
            currency: value.currency_iso_code().to_string(),
        }
    }
}

fn filled<'a>(attrs: &'a AttributeStore, key: &str) -> Option<&'a AttributeValue> {
    attrs.get(key).filter(|value| !value.is_null())
}

fn partial(mapping: &FieldMapping, present: &str, missing: &str) -> DecodeError {
    DecodeError::PartialRawData {
        composite: mapping.composite_field().to_string(),
        present: present.to_string(),
        missing: missing.to_string(),
    }
}

/// Balance as an amount string; numeric columns keep their exact scale
fn balance_string(field: &str, value: &AttributeValue) -> Result<String, DecodeError> {
    match value {
        AttributeValue::Text(text) => Ok(text.clone()),
        AttributeValue::Integer(i) => Ok(i.to_string()),
        AttributeValue::Decimal(d) => Ok(d.to_string()),
        other => Err(DecodeError::UnsupportedRawType {
            field: field.to_string(),
            found: other.type_name(),
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn codec() -> MoneyFieldCodec {
        MoneyFieldCodec::new(Arc::new(CurrencyRegistry::iso4217()))
    }

    fn price() -> FieldMapping {
        FieldMapping::new("price", "price_amount", "price_currency")
    }

    #[test]
    fn test_decode_text_pair() {
        let attrs: AttributeStore = [("price_amount", "19.99"), ("price_currency", "USD")]
            .into_iter()
            .collect();

        let money = codec().decode(&attrs, &price()).unwrap().unwrap();
        assert_eq!(money.amount_as_string(), "19.99");
        assert_eq!(money.currency_iso_code(), "USD");
    }

    #[test]
    fn test_decode_does_not_mutate_store() {
        let attrs: AttributeStore = [("price_amount", "1.00"), ("price_currency", "EUR")]
            .into_iter()
            .collect();
        let before = attrs.clone();

        codec().decode(&attrs, &price()).unwrap();
        assert_eq!(attrs, before);
    }

    #[test]
    fn test_decode_numeric_balances() {
        let mut attrs = AttributeStore::new();
        attrs.set("price_currency", "JPY");

        attrs.set("price_amount", 1200_i64);
        let money = codec().decode(&attrs, &price()).unwrap().unwrap();
        assert_eq!(money.amount_as_string(), "1200");

        attrs.set("price_amount", Decimal::from_str("3.50").unwrap());
        let money = codec().decode(&attrs, &price()).unwrap().unwrap();
        assert_eq!(money.amount_as_string(), "3.50");
    }

    #[test]
    fn test_absent_or_null_pair_skips_decoding() {
        assert_eq!(codec().decode(&AttributeStore::new(), &price()), Ok(None));

        let mut attrs = AttributeStore::new();
        attrs.set("price_amount", AttributeValue::Null);
        attrs.set("price_currency", AttributeValue::Null);
        assert_eq!(codec().decode(&attrs, &price()), Ok(None));
    }

    #[test]
    fn test_partial_pair_is_an_error() {
        let attrs: AttributeStore = [("price_amount", "5.00")].into_iter().collect();

        assert_eq!(
            codec().decode(&attrs, &price()),
            Err(DecodeError::PartialRawData {
                composite: "price".to_string(),
                present: "price_amount".to_string(),
                missing: "price_currency".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_currency_is_an_error() {
        let attrs: AttributeStore = [("price_amount", "5.00"), ("price_currency", "XYZ")]
            .into_iter()
            .collect();

        assert_eq!(
            codec().decode(&attrs, &price()),
            Err(DecodeError::UnknownCurrency {
                composite: "price".to_string(),
                code: "XYZ".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_amount_is_an_error() {
        let attrs: AttributeStore = [("price_amount", "5,00"), ("price_currency", "EUR")]
            .into_iter()
            .collect();

        assert!(matches!(
            codec().decode(&attrs, &price()),
            Err(DecodeError::InvalidAmount { ref amount, .. }) if amount == "5,00"
        ));
    }

    #[test]
    fn test_currency_must_be_text() {
        let mut attrs = AttributeStore::new();
        attrs.set("price_amount", "5.00");
        attrs.set("price_currency", 840_i64);

        assert_eq!(
            codec().decode(&attrs, &price()),
            Err(DecodeError::UnsupportedRawType {
                field: "price_currency".to_string(),
                found: "integer",
            })
        );
    }

    #[test]
    fn test_encode_and_write() {
        let codec = codec();
        let money = codec.currencies().money("EUR", "25.00").unwrap();

        let raw = codec.encode(&money);
        assert_eq!(raw.balance, "25.00");
        assert_eq!(raw.currency, "EUR");

        let mut attrs = AttributeStore::new();
        raw.write_to(&mut attrs, &price());
        assert_eq!(attrs.get("price_amount").and_then(AttributeValue::as_text), Some("25.00"));
        assert_eq!(attrs.get("price_currency").and_then(AttributeValue::as_text), Some("EUR"));
    }

    fn amount_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "-?[1-9][0-9]{0,8}(\\.[0-9]{1,6})?",
            "0(\\.[0-9]{1,6})?",
        ]
    }

    /// Canonical and non-canonical spellings: signs, leading zeros, bare
    /// fractions, digit separators and more fractional digits than fit.
    fn any_amount_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            amount_strategy(),
            "[+-]?0{0,3}[0-9]{1,4}(\\.[0-9]{0,4})?",
            "-0(\\.0{1,4})?",
            "[+-]?\\.[0-9]{1,4}",
            "[1-9]{1,3}_[0-9]{3}",
            "0\\.[0-9]{29,34}",
        ]
    }

    proptest! {
        /// decode then encode returns the raw pair string-for-string.
        #[test]
        fn prop_decode_encode_round_trip(
            amount in amount_strategy(),
            currency in prop::sample::select(vec!["USD", "EUR", "JPY", "GBP", "KWD", "CHF"]),
        ) {
            let codec = codec();
            let attrs: AttributeStore = [
                ("price_amount", amount.as_str()),
                ("price_currency", currency),
            ]
            .into_iter()
            .collect();

            let money = codec.decode(&attrs, &price()).unwrap().unwrap();
            let raw = codec.encode(&money);

            prop_assert_eq!(raw.balance, amount);
            prop_assert_eq!(raw.currency, currency);
        }

        /// Any balance either survives decode then encode exactly or is an
        /// `InvalidAmount`; it is never rounded or rewritten.
        #[test]
        fn prop_balance_is_exact_or_rejected(amount in any_amount_strategy()) {
            let codec = codec();
            let attrs: AttributeStore = [
                ("price_amount", amount.as_str()),
                ("price_currency", "USD"),
            ]
            .into_iter()
            .collect();

            match codec.decode(&attrs, &price()) {
                Ok(Some(money)) => prop_assert_eq!(codec.encode(&money).balance, amount),
                Err(DecodeError::InvalidAmount { amount: rejected, .. }) => {
                    prop_assert_eq!(rejected, amount)
                }
                other => prop_assert!(false, "unexpected decode result {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_canonical_balance_is_rejected() {
        for amount in ["+5", "007.50", ".5", "1_000", "0.12345678901234567890123456789"] {
            let attrs: AttributeStore = [("price_amount", amount), ("price_currency", "USD")]
                .into_iter()
                .collect();

            assert_eq!(
                codec().decode(&attrs, &price()),
                Err(DecodeError::InvalidAmount {
                    composite: "price".to_string(),
                    amount: amount.to_string(),
                })
            );
        }
    }
}
