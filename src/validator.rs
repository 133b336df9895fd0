// 📐 Config Validator - shape checks for the financial configuration
//
// Runs once per record type, before the protected-field guard is derived.
// Pure: nothing is registered or mutated here.

use serde_json::Value;
use std::collections::HashSet;

use crate::config::{FieldMapping, MappingConfiguration, BALANCE_KEY, CURRENCY_KEY};
use crate::error::ConfigError;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Check that `raw` is a well-formed `{ composite: { balance, currency } }` map
    pub fn validate(raw: &Value) -> Result<(), ConfigError> {
        Self::parse(raw).map(|_| ())
    }

    /// Validate and produce the typed configuration
    pub fn parse(raw: &Value) -> Result<MappingConfiguration, ConfigError> {
        let entries = raw.as_object().ok_or(ConfigError::InvalidRoot {
            found: json_type_name(raw),
        })?;

        let mappings = entries
            .iter()
            .map(|(field, entry)| Self::parse_entry(field, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Self::check_mappings(&mappings)?;

        Ok(MappingConfiguration::from_mappings(mappings))
    }

    fn parse_entry(field: &str, entry: &Value) -> Result<FieldMapping, ConfigError> {
        let entry = entry.as_object().ok_or_else(|| ConfigError::MalformedMapping {
            field: field.to_string(),
            reason: format!("entry is {}, not a map", json_type_name(entry)),
        })?;

        let balance = required_name(field, entry, BALANCE_KEY)?;
        let currency = required_name(field, entry, CURRENCY_KEY)?;

        Ok(FieldMapping::new(field, balance, currency))
    }

    /// Invariants across names: non-empty, and no name claimed twice.
    ///
    /// Inside a mapping the composite, balance and currency names are pairwise
    /// distinct. Across mappings no raw field is shared, and no raw field
    /// doubles as another mapping's composite name.
    pub fn check_mappings(mappings: &[FieldMapping]) -> Result<(), ConfigError> {
        let mut composites: HashSet<&str> = HashSet::with_capacity(mappings.len());

        for mapping in mappings {
            let field = mapping.composite_field();

            if field.is_empty() {
                return Err(ConfigError::MalformedMapping {
                    field: field.to_string(),
                    reason: "composite field name is empty".to_string(),
                });
            }

            for (key, name) in [
                (BALANCE_KEY, mapping.balance_field()),
                (CURRENCY_KEY, mapping.currency_field()),
            ] {
                if name.is_empty() {
                    return Err(ConfigError::MalformedMapping {
                        field: field.to_string(),
                        reason: format!("`{key}` names an empty field"),
                    });
                }
            }

            if !composites.insert(field) {
                return Err(conflict(field, field));
            }
        }

        let mut raw_fields: HashSet<&str> = HashSet::with_capacity(mappings.len() * 2);

        for mapping in mappings {
            let field = mapping.composite_field();

            if mapping.balance_field() == mapping.currency_field() {
                return Err(conflict(field, mapping.currency_field()));
            }

            for name in mapping.raw_fields() {
                if composites.contains(name) || !raw_fields.insert(name) {
                    return Err(conflict(field, name));
                }
            }
        }

        Ok(())
    }
}

fn required_name(
    field: &str,
    entry: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<String, ConfigError> {
    match entry.get(key) {
        None => Err(ConfigError::MalformedMapping {
            field: field.to_string(),
            reason: format!("missing key `{key}`"),
        }),
        Some(Value::String(name)) if !name.is_empty() => Ok(name.clone()),
        Some(Value::String(_)) => Err(ConfigError::MalformedMapping {
            field: field.to_string(),
            reason: format!("`{key}` names an empty field"),
        }),
        Some(other) => Err(ConfigError::MalformedMapping {
            field: field.to_string(),
            reason: format!("`{key}` must be a field name, got {}", json_type_name(other)),
        }),
    }
}

fn conflict(field: &str, name: &str) -> ConfigError {
    ConfigError::ConflictingFieldName {
        field: field.to_string(),
        name: name.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

// ============================================================================
// TESTS
// ============================================================================
