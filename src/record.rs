// 🧾 Record - one instance of a financial record type
//
// Identity: UUID (never changes)
// State: attribute store + lifecycle phase
//
// The record owns its attribute store and calls the type's controller at
// every trigger point. Nothing outside the controller touches raw money
// fields. Persistence itself belongs to the caller: `save` hands over a store
// that holds only raw scalars.

use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use crate::attributes::{AttributeStore, AttributeValue};
use crate::error::{AttributeError, DecodeError, RecordError, SetupError};
use crate::lifecycle::{AttributeLifecycleController, LifecyclePhase};
use crate::money::Money;
use crate::registry::{FinancialRecord, SetupRegistry};

pub struct Record<T: FinancialRecord> {
    id: Uuid,
    controller: Arc<AttributeLifecycleController>,
    attributes: AttributeStore,
    phase: LifecyclePhase,
    fetched_at: Option<DateTime<Utc>>,
    saved_at: Option<DateTime<Utc>>,
    _record_type: PhantomData<fn() -> T>,
}

impl<T: FinancialRecord> Record<T> {
    /// Empty record that was never stored
    pub fn new(registry: &SetupRegistry) -> Result<Self, SetupError> {
        let controller = registry.prepare::<T>()?;

        Ok(Record {
            id: Uuid::new_v4(),
            controller,
            attributes: AttributeStore::new(),
            phase: LifecyclePhase::New,
            fetched_at: None,
            saved_at: None,
            _record_type: PhantomData,
        })
    }

    /// Record loaded from storage; runs the fetch trigger over `raw`
    pub fn fetched(registry: &SetupRegistry, raw: AttributeStore) -> Result<Self, RecordError> {
        let mut record = Self::new(registry)?;
        record.attributes = raw;
        record.controller.after_fetch(&mut record.attributes)?;
        record.phase = LifecyclePhase::Fetched;
        record.fetched_at = Some(Utc::now());

        tracing::debug!(
            record_type = T::RECORD_TYPE,
            record_id = %record.id,
            phase = record.phase.as_str(),
            "record fetched"
        );
        Ok(record)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    /// Read-only view of the whole store (no trigger runs)
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn controller(&self) -> &AttributeLifecycleController {
        &self.controller
    }

    /// Read one attribute; composites are decoded on first access
    pub fn get(&mut self, key: &str) -> Result<Option<&AttributeValue>, DecodeError> {
        self.controller.before_get_attribute(&mut self.attributes, key)?;
        Ok(self.attributes.get(key))
    }

    /// Read a composite field as money (`None` when empty or not money)
    pub fn money(&mut self, key: &str) -> Result<Option<&Money>, DecodeError> {
        Ok(self.get(key)?.and_then(AttributeValue::as_money))
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttributeValue>) -> Result<(), AttributeError> {
        self.controller
            .set_attribute(&mut self.attributes, key, value.into())
    }

    pub fn unset(&mut self, key: &str) -> Result<Option<AttributeValue>, AttributeError> {
        self.controller.unset_attribute(&mut self.attributes, key)
    }

    /// Pre-save, persist, post-save.
    ///
    /// `persist` sees only raw scalars. If it fails, composites are restored
    /// from the raw fields and the record keeps its previous phase. Once it
    /// succeeded the record is `Saved`, even when re-deriving composites
    /// fails; that case is `RecordError::Rederive`.
    pub fn save<F>(&mut self, persist: F) -> Result<(), RecordError>
    where
        F: FnOnce(&AttributeStore) -> anyhow::Result<()>,
    {
        let previous = self.phase;

        self.controller.before_save(&mut self.attributes)?;
        self.phase = LifecyclePhase::Saving;

        if let Err(source) = persist(&self.attributes) {
            if let Err(err) = self.controller.after_save(&mut self.attributes) {
                tracing::warn!(
                    record_type = T::RECORD_TYPE,
                    record_id = %self.id,
                    error = %err,
                    "could not restore composite fields after failed persist"
                );
            }
            self.phase = previous;
            return Err(RecordError::Persist {
                record_type: T::RECORD_TYPE,
                source,
            });
        }

        self.phase = LifecyclePhase::Saved;
        self.saved_at = Some(Utc::now());

        if let Err(source) = self.controller.after_save(&mut self.attributes) {
            tracing::warn!(
                record_type = T::RECORD_TYPE,
                record_id = %self.id,
                error = %source,
                "record persisted without composite fields"
            );
            return Err(RecordError::Rederive {
                record_type: T::RECORD_TYPE,
                source,
            });
        }

        tracing::debug!(
            record_type = T::RECORD_TYPE,
            record_id = %self.id,
            phase = self.phase.as_str(),
            "record saved"
        );
        Ok(())
    }
}

impl<T: FinancialRecord> std::fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("record_type", &T::RECORD_TYPE)
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("attributes", &self.attributes)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
