// ⚙️ Mapping Configuration - which composite fields exist and what backs them
//
// Declared per record type as
//   { "price": { "balance": "price_amount", "currency": "price_currency" } }
//
// Loaded from a JSON value, a JSON string, a file, or built in code.
// Every path goes through ConfigValidator before a configuration exists.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::validator::ConfigValidator;

/// Key naming the raw balance field inside a mapping entry
pub const BALANCE_KEY: &str = "balance";

/// Key naming the raw currency field inside a mapping entry
pub const CURRENCY_KEY: &str = "currency";

// ============================================================================
// FIELD MAPPING
// ============================================================================

/// One composite money field and the two raw fields behind it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMapping {
    composite: String,
    balance: String,
    currency: String,
}

impl FieldMapping {
    pub(crate) fn new(
        composite: impl Into<String>,
        balance: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        FieldMapping {
            composite: composite.into(),
            balance: balance.into(),
            currency: currency.into(),
        }
    }

    pub fn composite_field(&self) -> &str {
        &self.composite
    }

    pub fn balance_field(&self) -> &str {
        &self.balance
    }

    pub fn currency_field(&self) -> &str {
        &self.currency
    }

    /// `[balance, currency]`
    pub fn raw_fields(&self) -> [&str; 2] {
        [&self.balance, &self.currency]
    }
}

// ============================================================================
// MAPPING CONFIGURATION
// ============================================================================

/// Validated set of field mappings for one record type, keyed by composite name.
///
/// An empty configuration is legal; every lifecycle trigger is then a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingConfiguration {
    mappings: BTreeMap<String, FieldMapping>,
}

impl MappingConfiguration {
    /// Configuration with no composite fields
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> MappingConfigurationBuilder {
        MappingConfigurationBuilder::default()
    }

    /// Validate and build from a declared JSON map
    pub fn from_value(raw: &serde_json::Value) -> Result<Self, ConfigError> {
        ConfigValidator::parse(raw)
    }

    /// Parse JSON text, then validate
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: serde_json::Value =
            serde_json::from_str(json).context("Failed to parse financial configuration JSON")?;

        Ok(Self::from_value(&raw)?)
    }

    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read financial configuration file: {:?}", path.as_ref())
        })?;

        Self::from_json_str(&content)
            .with_context(|| format!("Invalid financial configuration in {:?}", path.as_ref()))
    }

    /// Caller guarantees the mappings already passed the invariant checks
    pub(crate) fn from_mappings(mappings: Vec<FieldMapping>) -> Self {
        MappingConfiguration {
            mappings: mappings
                .into_iter()
                .map(|mapping| (mapping.composite.clone(), mapping))
                .collect(),
        }
    }

    pub fn get(&self, composite: &str) -> Option<&FieldMapping> {
        self.mappings.get(composite)
    }

    pub fn is_composite(&self, name: &str) -> bool {
        self.mappings.contains_key(name)
    }

    /// Mappings in composite-name order
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.values()
    }

    pub fn composite_fields(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Back to the declarative JSON shape
    pub fn to_value(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|mapping| {
                (
                    mapping.composite.clone(),
                    serde_json::json!({
                        BALANCE_KEY: mapping.balance,
                        CURRENCY_KEY: mapping.currency,
                    }),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Programmatic construction; `build` runs the same checks as JSON input.
#[derive(Debug, Default)]
pub struct MappingConfigurationBuilder {
    mappings: Vec<FieldMapping>,
}

impl MappingConfigurationBuilder {
    /// Builder: declare one composite field
    pub fn map(
        mut self,
        composite: impl Into<String>,
        balance: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        self.mappings
            .push(FieldMapping::new(composite, balance, currency));
        self
    }

    pub fn build(self) -> Result<MappingConfiguration, ConfigError> {
        ConfigValidator::check_mappings(&self.mappings)?;
        Ok(MappingConfiguration::from_mappings(self.mappings))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_from_value() {
        let config = MappingConfiguration::from_value(&json!({
            "price": { "balance": "price_amount", "currency": "price_currency" }
        }))
        .unwrap();

        let mapping = config.get("price").unwrap();
        assert_eq!(mapping.composite_field(), "price");
        assert_eq!(mapping.balance_field(), "price_amount");
        assert_eq!(mapping.currency_field(), "price_currency");
        assert!(config.is_composite("price"));
        assert!(!config.is_composite("price_amount"));
    }

    #[test]
    fn test_empty_configuration_is_legal() {
        let config = MappingConfiguration::from_value(&json!({})).unwrap();
        assert!(config.is_empty());
        assert_eq!(config, MappingConfiguration::empty());
    }

    #[test]
    fn test_builder_matches_json() {
        let built = MappingConfiguration::builder()
            .map("total", "total_amount", "total_currency")
            .map("fee", "fee_amount", "fee_currency")
            .build()
            .unwrap();

        let parsed = MappingConfiguration::from_value(&built.to_value()).unwrap();
        assert_eq!(built, parsed);
        assert_eq!(
            built.composite_fields().collect::<Vec<_>>(),
            vec!["fee", "total"]
        );
    }

    #[test]
    fn test_builder_rejects_duplicate_raw_field() {
        let result = MappingConfiguration::builder()
            .map("total", "amount", "currency")
            .map("fee", "fee_amount", "currency")
            .build();

        assert!(matches!(result, Err(ConfigError::ConflictingFieldName { .. })));
    }

    #[test]
    fn test_from_json_str_reports_bad_json() {
        let err = MappingConfiguration::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse financial configuration JSON"));
    }

    #[test]
    fn test_from_json_str_keeps_config_error() {
        let err = MappingConfiguration::from_json_str(r#"{"price": {"balance": "bal"}}"#)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MalformedMapping { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"balance": {{"balance": "balance_amount", "currency": "balance_currency"}}}}"#
        )
        .unwrap();

        let config = MappingConfiguration::from_file(file.path()).unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("balance").unwrap().balance_field(), "balance_amount");
    }

    #[test]
    fn test_from_missing_file() {
        let err = MappingConfiguration::from_file("/nonexistent/financial.json").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to read financial configuration file"));
    }
}
