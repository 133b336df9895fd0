// ⚠️ Error Types - one enum per failure scope
//
// Setup errors (ConfigError, SetupError) are fatal for a record type.
// Attribute errors are scoped to a single write and leave the record untouched.

use thiserror::Error;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Shape errors in a `{ composite: { "balance": ..., "currency": ... } }` map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration itself is not a key-value map.
    #[error("financial configuration has to be a map of composite field names, got {found}")]
    InvalidRoot { found: &'static str },

    /// An entry is not a map, or lacks a usable `balance` / `currency` key.
    #[error(
        "invalid financial configuration for `{field}`: {reason} \
         (expected {{\"balance\": \"...\", \"currency\": \"...\"}})"
    )]
    MalformedMapping { field: String, reason: String },

    /// A field name is claimed twice (inside one mapping or across mappings).
    #[error("field name `{name}` used by `{field}` is already claimed by the financial configuration")]
    ConflictingFieldName { field: String, name: String },
}

/// Record-type preparation failures. Nothing is registered when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("record type `{record_type}` must declare a financial configuration to use composite money fields")]
    MissingConfiguration { record_type: &'static str },

    #[error("record type `{record_type}` has an invalid financial configuration")]
    Config {
        record_type: &'static str,
        #[source]
        source: ConfigError,
    },
}

// ============================================================================
// CODEC
// ============================================================================

/// Raw balance/currency data that cannot become a money value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Only one of the two raw fields carries data.
    #[error("composite field `{composite}` has `{present}` but `{missing}` is empty")]
    PartialRawData {
        composite: String,
        present: String,
        missing: String,
    },

    #[error("composite field `{composite}` references unknown currency code `{code}`")]
    UnknownCurrency { composite: String, code: String },

    #[error("composite field `{composite}` has an invalid amount `{amount}`")]
    InvalidAmount { composite: String, amount: String },

    /// Raw field holds a value type that cannot carry a balance or currency code.
    #[error("raw field `{field}` cannot hold a {found} value")]
    UnsupportedRawType { field: String, found: &'static str },
}

// ============================================================================
// ATTRIBUTE WRITES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("cannot write protected field `{field}`; set `{composite}` instead")]
    ProtectedField { field: String, composite: String },

    #[error("field `{field}` can only be set with a money value, got {found}")]
    InvalidValueType { field: String, found: &'static str },

    /// Money whose currency this record type could never decode again.
    #[error("field `{field}` cannot be set with money in unregistered currency `{code}`")]
    UnregisteredCurrency { field: String, code: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// The caller's persist callback failed; the composite view was restored.
    #[error("persisting `{record_type}` record failed")]
    Persist {
        record_type: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The row was persisted, but composites could not be re-derived from it.
    #[error("`{record_type}` record was persisted, but its composite fields could not be re-derived")]
    Rederive {
        record_type: &'static str,
        #[source]
        source: DecodeError,
    },
}

impl From<DecodeError> for RecordError {
    fn from(err: DecodeError) -> Self {
        RecordError::Attribute(AttributeError::Decode(err))
    }
}
