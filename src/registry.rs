// 📚 Setup Registry - one prepared controller per record type
//
// Replaces a process-wide "already booted" flag with an explicit registry
// keyed by type identity. The check and the insert happen under one write
// lock, so a type is prepared at most once and a failed preparation leaves
// nothing behind.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::error::SetupError;
use crate::lifecycle::AttributeLifecycleController;
use crate::money::CurrencyRegistry;

/// A record type that exposes composite money fields.
pub trait FinancialRecord: 'static {
    /// Name used in logs and error messages
    const RECORD_TYPE: &'static str;

    /// Declared `{ composite: { "balance": ..., "currency": ... } }` map.
    ///
    /// `None` means the type declares no configuration at all; preparing it
    /// fails with `SetupError::MissingConfiguration`.
    fn financial() -> Option<serde_json::Value>;
}

pub struct SetupRegistry {
    currencies: Arc<CurrencyRegistry>,
    prepared: RwLock<HashMap<TypeId, Arc<AttributeLifecycleController>>>,
}

impl SetupRegistry {
    /// Registry backed by the default ISO 4217 currency set
    pub fn new() -> Self {
        Self::with_currencies(Arc::new(CurrencyRegistry::iso4217()))
    }

    pub fn with_currencies(currencies: Arc<CurrencyRegistry>) -> Self {
        SetupRegistry {
            currencies,
            prepared: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static SetupRegistry {
        static GLOBAL: OnceLock<SetupRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SetupRegistry::new)
    }

    pub fn currencies(&self) -> &Arc<CurrencyRegistry> {
        &self.currencies
    }

    /// Prepare `T` once and return its controller.
    ///
    /// Later calls return the same controller without running setup again.
    pub fn prepare<T: FinancialRecord>(&self) -> Result<Arc<AttributeLifecycleController>, SetupError> {
        if let Some(controller) = self.controller::<T>() {
            return Ok(controller);
        }

        let mut prepared = self.prepared.write().unwrap_or_else(PoisonError::into_inner);

        // another caller may have prepared T between the two locks
        if let Some(controller) = prepared.get(&TypeId::of::<T>()) {
            return Ok(Arc::clone(controller));
        }

        let declared = T::financial();
        let controller = AttributeLifecycleController::setup(
            T::RECORD_TYPE,
            declared.as_ref(),
            Arc::clone(&self.currencies),
        )
        .inspect_err(|err| {
            tracing::warn!(record_type = T::RECORD_TYPE, error = %err, "record type preparation failed");
        })?;

        let controller = Arc::new(controller);
        prepared.insert(TypeId::of::<T>(), Arc::clone(&controller));

        tracing::debug!(record_type = T::RECORD_TYPE, "record type prepared");
        Ok(controller)
    }

    /// Controller for `T` if it was already prepared
    pub fn controller<T: FinancialRecord>(&self) -> Option<Arc<AttributeLifecycleController>> {
        self.prepared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()
    }

    pub fn is_prepared<T: FinancialRecord>(&self) -> bool {
        self.controller::<T>().is_some()
    }

    /// Number of prepared record types
    pub fn prepared_count(&self) -> usize {
        self.prepared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for SetupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
