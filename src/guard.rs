// 🔒 Protected Field Guard - raw balance/currency fields are read-only
//
// Once a composite mapping claims a raw field, the only way to change it is
// through the composite money value. Direct writes are rejected before they
// reach the attribute store.

use std::collections::BTreeMap;

use crate::config::MappingConfiguration;
use crate::error::AttributeError;

/// Union of every raw field claimed by a mapping, each with its owning composite.
///
/// Derived once per record type and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedFieldSet {
    /// raw field name → composite field that owns it
    owners: BTreeMap<String, String>,
}

impl ProtectedFieldSet {
    /// Derive the set from a validated configuration (pure)
    pub fn derive(config: &MappingConfiguration) -> Self {
        let owners = config
            .iter()
            .flat_map(|mapping| {
                mapping
                    .raw_fields()
                    .map(|raw| (raw.to_string(), mapping.composite_field().to_string()))
            })
            .collect();

        ProtectedFieldSet { owners }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    /// Composite field that owns a protected raw field
    pub fn owner(&self, name: &str) -> Option<&str> {
        self.owners.get(name).map(String::as_str)
    }

    /// Reject a direct write to `name` if it is protected
    pub fn check_write(&self, name: &str) -> Result<(), AttributeError> {
        match self.owner(name) {
            Some(composite) => Err(AttributeError::ProtectedField {
                field: name.to_string(),
                composite: composite.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Protected names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.owners.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Free-function form of [`ProtectedFieldSet::derive`]
pub fn derive_protected_fields(config: &MappingConfiguration) -> ProtectedFieldSet {
    ProtectedFieldSet::derive(config)
}

/// Free-function form of [`ProtectedFieldSet::is_protected`]
pub fn is_protected(name: &str, set: &ProtectedFieldSet) -> bool {
    set.is_protected(name)
}
