#![forbid(unsafe_code)]

//! Immutable views of the store and their formatted `{values, errors}` form.

use std::fmt;
use std::sync::Arc;

use formizer_core::{ErrorCode, FieldValue};
use indexmap::IndexMap;

use crate::field::Field;

/// Insertion-ordered map of field name to field.
pub type FieldMap = IndexMap<String, Field>;

// ---------------------------------------------------------------------------
// FieldsSnapshot
// ---------------------------------------------------------------------------

/// The whole field map at one instant.
///
/// Cheap to clone. Later store operations publish new snapshots and never
/// touch this one.
#[derive(Clone, Default)]
pub struct FieldsSnapshot {
    fields: Arc<FieldMap>,
}

impl FieldsSnapshot {
    pub(crate) fn new(fields: Arc<FieldMap>) -> Self {
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name).map(Field::value)
    }

    #[must_use]
    pub fn errors(&self, name: &str) -> Option<&[ErrorCode]> {
        self.get(name).map(Field::errors)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Field names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns `true` when no field currently holds errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.values().all(Field::is_valid)
    }

    /// The formatted `{values, errors}` pair.
    #[must_use]
    pub fn data(&self) -> FieldsData {
        format_fields_data(&self.fields)
    }

    /// Returns `true` if both snapshots share the same underlying map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }
}

impl fmt::Debug for FieldsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

// ---------------------------------------------------------------------------
// FieldsData
// ---------------------------------------------------------------------------

/// Name-keyed values and errors, as handed to callbacks and the bridge.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldsData {
    pub values: IndexMap<String, FieldValue>,
    pub errors: IndexMap<String, Vec<ErrorCode>>,
}

impl FieldsData {
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn field_errors(&self, name: &str) -> Option<&[ErrorCode]> {
        self.errors.get(name).map(Vec::as_slice)
    }

    /// Returns `true` when every error list is empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    /// Names with a non-empty error list, in registration order.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|(_, errs)| !errs.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Split a field map into its `{values, errors}` form.
#[must_use]
pub fn format_fields_data(fields: &FieldMap) -> FieldsData {
    let mut data = FieldsData {
        values: IndexMap::with_capacity(fields.len()),
        errors: IndexMap::with_capacity(fields.len()),
    };
    for (name, field) in fields {
        data.values.insert(name.clone(), field.value.clone());
        data.errors.insert(name.clone(), field.errors.clone());
    }
    data
}
