// ⏱️ Attribute Lifecycle Controller - when each transformation runs
//
// One controller per record type, built once at setup. Each trigger point is
// an explicit method taking the record's attribute store as a parameter:
//
//   fetch      → decode raw pairs into composite money values
//   set        → guard raw fields, type-check composites, encode on write
//   get        → decode lazily when a composite is read before it exists
//   pre-save   → encode-if-missing, then drop composite keys
//   post-save  → re-derive composites (same as fetch)
//
// Raw-field visibility: raw balance/currency fields always stay in the store
// and are readable. Only the controller writes them. Composite keys live
// between fetch and pre-save and are restored post-save.
//
// Every trigger computes its changes first and applies them only when all of
// them succeeded, so a failing trigger leaves the store untouched.

use std::sync::Arc;

use crate::attributes::{AttributeStore, AttributeValue};
use crate::codec::{MoneyFieldCodec, RawMoney};
use crate::config::{FieldMapping, MappingConfiguration};
use crate::error::{AttributeError, DecodeError, SetupError};
use crate::guard::ProtectedFieldSet;
use crate::money::{CurrencyRegistry, Money};
use crate::validator::ConfigValidator;

// ============================================================================
// LIFECYCLE PHASE
// ============================================================================

/// Where a record instance stands in its fetch/save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Created in memory, never fetched or saved
    New,
    /// Raw attributes loaded from storage and decoded
    Fetched,
    /// Composite keys dropped; store holds only raw scalars for persistence
    Saving,
    /// Persisted and composites re-derived
    Saved,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::New => "new",
            LifecyclePhase::Fetched => "fetched",
            LifecyclePhase::Saving => "saving",
            LifecyclePhase::Saved => "saved",
        }
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[derive(Debug)]
pub struct AttributeLifecycleController {
    record_type: &'static str,
    config: MappingConfiguration,
    protected: ProtectedFieldSet,
    codec: MoneyFieldCodec,
}

impl AttributeLifecycleController {
    /// Setup for one record type: validate the declared configuration, then
    /// derive the protected-field set.
    ///
    /// `None` means the type declares no configuration at all, which is fatal.
    pub fn setup(
        record_type: &'static str,
        declared: Option<&serde_json::Value>,
        currencies: Arc<CurrencyRegistry>,
    ) -> Result<Self, SetupError> {
        let declared = declared.ok_or(SetupError::MissingConfiguration { record_type })?;

        let config = ConfigValidator::parse(declared)
            .map_err(|source| SetupError::Config { record_type, source })?;

        Ok(Self::with_configuration(record_type, config, currencies))
    }

    /// Setup from an already validated configuration
    pub fn with_configuration(
        record_type: &'static str,
        config: MappingConfiguration,
        currencies: Arc<CurrencyRegistry>,
    ) -> Self {
        let protected = ProtectedFieldSet::derive(&config);

        tracing::debug!(
            record_type,
            composites = config.len(),
            protected = protected.len(),
            "financial field mapping prepared"
        );

        AttributeLifecycleController {
            record_type,
            config,
            protected,
            codec: MoneyFieldCodec::new(currencies),
        }
    }

    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    pub fn configuration(&self) -> &MappingConfiguration {
        &self.config
    }

    pub fn protected_fields(&self) -> &ProtectedFieldSet {
        &self.protected
    }

    pub fn codec(&self) -> &MoneyFieldCodec {
        &self.codec
    }

    // ------------------------------------------------------------------------
    // attribute-write
    // ------------------------------------------------------------------------

    /// Guarded write of one attribute.
    ///
    /// - protected raw field → `ProtectedField`
    /// - composite field with a non-money value → `InvalidValueType`
    /// - composite field with money in a currency missing from the registry →
    ///   `UnregisteredCurrency`
    /// - composite field with money → raw pair encoded and written, then the
    ///   composite itself
    /// - anything else → plain write
    pub fn set_attribute(
        &self,
        attrs: &mut AttributeStore,
        key: &str,
        value: AttributeValue,
    ) -> Result<(), AttributeError> {
        if let Err(err) = self.protected.check_write(key) {
            tracing::warn!(record_type = self.record_type, field = key, "rejected write to protected field");
            return Err(err);
        }

        if let Some(mapping) = self.config.get(key) {
            let money = match value {
                AttributeValue::Money(money) => money,
                other => {
                    tracing::warn!(
                        record_type = self.record_type,
                        field = key,
                        found = other.type_name(),
                        "rejected non-money value for composite field"
                    );
                    return Err(AttributeError::InvalidValueType {
                        field: key.to_string(),
                        found: other.type_name(),
                    });
                }
            };

            let code = money.currency_iso_code();
            if !self.codec.currencies().contains(code) {
                tracing::warn!(
                    record_type = self.record_type,
                    field = key,
                    code,
                    "rejected money in unregistered currency"
                );
                return Err(AttributeError::UnregisteredCurrency {
                    field: key.to_string(),
                    code: code.to_string(),
                });
            }

            // internal write: raw fields bypass the guard here
            self.codec.encode(&money).write_to(attrs, mapping);
            attrs.set(key, money);

            tracing::trace!(record_type = self.record_type, composite = key, "composite field written");
            return Ok(());
        }

        attrs.set(key, value);
        Ok(())
    }

    /// Guarded removal of one attribute.
    ///
    /// Protected raw fields cannot be removed. Removing a composite drops only
    /// the cached value; its raw pair stays, so the value comes back on the
    /// next read.
    pub fn unset_attribute(
        &self,
        attrs: &mut AttributeStore,
        key: &str,
    ) -> Result<Option<AttributeValue>, AttributeError> {
        self.protected.check_write(key)?;
        Ok(attrs.unset(key))
    }

    // ------------------------------------------------------------------------
    // attribute-read
    // ------------------------------------------------------------------------

    /// Before reading `key`: a composite that is absent while its raw pair is
    /// filled gets decoded and cached.
    pub fn before_get_attribute(
        &self,
        attrs: &mut AttributeStore,
        key: &str,
    ) -> Result<(), DecodeError> {
        let Some(mapping) = self.config.get(key) else {
            return Ok(());
        };

        if attrs.exists(key) {
            return Ok(());
        }

        if let Some(money) = self.codec.decode(attrs, mapping)? {
            attrs.set(key, money);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // fetch / post-save
    // ------------------------------------------------------------------------

    /// After raw attributes were loaded: build every composite value.
    ///
    /// A composite whose raw pair is empty is set to `Null`.
    pub fn after_fetch(&self, attrs: &mut AttributeStore) -> Result<(), DecodeError> {
        self.derive_composites(attrs, "fetch")
    }

    /// After a successful persist: re-derive composites from the raw fields
    pub fn after_save(&self, attrs: &mut AttributeStore) -> Result<(), DecodeError> {
        self.derive_composites(attrs, "save")
    }

    fn derive_composites(
        &self,
        attrs: &mut AttributeStore,
        trigger: &'static str,
    ) -> Result<(), DecodeError> {
        let mut decoded: Vec<(&FieldMapping, Option<Money>)> = Vec::with_capacity(self.config.len());

        for mapping in self.config.iter() {
            match self.codec.decode(attrs, mapping) {
                Ok(money) => decoded.push((mapping, money)),
                Err(err) => {
                    tracing::warn!(record_type = self.record_type, trigger, error = %err, "decoding composite fields failed");
                    return Err(err);
                }
            }
        }

        for (mapping, money) in decoded {
            attrs.set(mapping.composite_field(), AttributeValue::from(money));
        }

        tracing::debug!(record_type = self.record_type, trigger, "composite fields derived");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // pre-save
    // ------------------------------------------------------------------------

    /// Before the raw write-through: fill empty raw fields from the composite
    /// value, then remove every composite key so only raw scalars persist.
    pub fn before_save(&self, attrs: &mut AttributeStore) -> Result<(), AttributeError> {
        let mut fills: Vec<(&FieldMapping, RawMoney)> = Vec::new();

        for mapping in self.config.iter() {
            let composite = mapping.composite_field();
            let raw_missing = !attrs.is_filled(mapping.balance_field())
                || !attrs.is_filled(mapping.currency_field());

            match attrs.get(composite) {
                Some(AttributeValue::Money(money)) if raw_missing => {
                    fills.push((mapping, self.codec.encode(money)));
                }
                Some(AttributeValue::Money(_)) | Some(AttributeValue::Null) | None => {}
                Some(other) if raw_missing => {
                    return Err(AttributeError::InvalidValueType {
                        field: composite.to_string(),
                        found: other.type_name(),
                    });
                }
                Some(_) => {}
            }
        }

        for (mapping, raw) in fills {
            if !attrs.is_filled(mapping.balance_field()) {
                attrs.set(mapping.balance_field(), raw.balance);
            }
            if !attrs.is_filled(mapping.currency_field()) {
                attrs.set(mapping.currency_field(), raw.currency);
            }
        }

        for composite in self.config.composite_fields() {
            attrs.unset(composite);
        }

        tracing::debug!(record_type = self.record_type, "composite fields purged for persistence");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
