// 🗂️ Attribute Store - the record's raw key/value storage
//
// "Aggregates as maps, not structs": a record is a bag of named attributes.
// Raw scalars (balance, currency code, ...) and composite money values live
// side by side under string keys. Key order is never relied upon.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::money::Money;

// ============================================================================
// ATTRIBUTE VALUE
// ============================================================================

/// A single attribute value, raw scalar or composite.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Exact decimal (e.g. a NUMERIC column)
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Anything structured that has no dedicated variant
    Json(serde_json::Value),
    /// Composite money value built by the field mapping
    Money(Money),
}

impl AttributeValue {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Decimal(_) => "decimal",
            AttributeValue::Text(_) => "text",
            AttributeValue::Timestamp(_) => "timestamp",
            AttributeValue::Json(_) => "json",
            AttributeValue::Money(_) => "money",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_money(&self) -> Option<&Money> {
        match self {
            AttributeValue::Money(money) => Some(money),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render as JSON for persistence.
    ///
    /// Decimals become strings so no precision is lost on the way out.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Integer(i) => Value::from(*i),
            AttributeValue::Decimal(d) => Value::String(d.to_string()),
            AttributeValue::Text(s) => Value::String(s.clone()),
            AttributeValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
            AttributeValue::Json(v) => v.clone(),
            AttributeValue::Money(m) => serde_json::json!({
                "amount": m.amount_as_string(),
                "currency": m.currency_iso_code(),
            }),
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Integer(i)
                } else {
                    let repr = n.to_string();
                    Decimal::from_str(&repr)
                        .or_else(|_| Decimal::from_scientific(&repr))
                        .map(AttributeValue::Decimal)
                        .unwrap_or(AttributeValue::Text(repr))
                }
            }
            Value::String(s) => AttributeValue::Text(s),
            other => AttributeValue::Json(other),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<Decimal> for AttributeValue {
    fn from(value: Decimal) -> Self {
        AttributeValue::Decimal(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::Timestamp(value)
    }
}

impl From<Money> for AttributeValue {
    fn from(value: Money) -> Self {
        AttributeValue::Money(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

// ============================================================================
// ATTRIBUTE STORE
// ============================================================================

/// Raw attribute storage owned by one record instance.
///
/// `exists` and `is_filled` differ on purpose: a key can be present with a
/// `Null` value ("exists") without carrying data ("filled").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    values: HashMap<String, AttributeValue>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object row; non-object input yields an empty store
    pub fn from_json(row: serde_json::Value) -> Self {
        match row {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| (key, AttributeValue::from(value)))
                .collect(),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    /// Insert or replace, returning the previous value
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn unset(&mut self, key: &str) -> Option<AttributeValue> {
        self.values.remove(key)
    }

    /// Key is present, even if its value is `Null`
    pub fn exists(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Key is present and not `Null`
    pub fn is_filled(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|value| !value.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render every attribute as one JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeStore
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AttributeStore {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exists_vs_filled() {
        let mut store = AttributeStore::new();
        store.set("price_amount", AttributeValue::Null);

        assert!(store.exists("price_amount"));
        assert!(!store.is_filled("price_amount"));
        assert!(!store.exists("price_currency"));
        assert!(!store.is_filled("price_currency"));
    }

    #[test]
    fn test_set_returns_previous_value() {
        let mut store = AttributeStore::new();

        assert_eq!(store.set("name", "first"), None);
        assert_eq!(
            store.set("name", "second"),
            Some(AttributeValue::Text("first".to_string()))
        );
        assert_eq!(store.get("name").and_then(AttributeValue::as_text), Some("second"));
    }

    #[test]
    fn test_unset_removes_key() {
        let mut store: AttributeStore = [("a", 1_i64)].into_iter().collect();

        assert_eq!(store.unset("a"), Some(AttributeValue::Integer(1)));
        assert!(store.is_empty());
        assert_eq!(store.unset("a"), None);
    }

    #[test]
    fn test_from_json_row() {
        let store = AttributeStore::from_json(json!({
            "price_amount": 19.99,
            "price_currency": "USD",
            "quantity": 3,
            "archived": null,
            "tags": ["a", "b"],
        }));

        assert_eq!(
            store.get("price_amount"),
            Some(&AttributeValue::Decimal(Decimal::from_str("19.99").unwrap()))
        );
        assert_eq!(store.get("price_currency").and_then(AttributeValue::as_text), Some("USD"));
        assert_eq!(store.get("quantity"), Some(&AttributeValue::Integer(3)));
        assert!(store.exists("archived"));
        assert!(!store.is_filled("archived"));
        assert_eq!(store.get("tags").map(AttributeValue::type_name), Some("json"));
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        assert!(AttributeStore::from_json(json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_to_json_keeps_decimal_exact() {
        let store: AttributeStore = [("balance", Decimal::from_str("10.50").unwrap())]
            .into_iter()
            .collect();

        assert_eq!(store.to_json(), json!({ "balance": "10.50" }));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(AttributeValue::from(None::<&str>), AttributeValue::Null);
        assert_eq!(
            AttributeValue::from(Some("EUR")),
            AttributeValue::Text("EUR".to_string())
        );
    }
}
