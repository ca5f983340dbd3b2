//! Patient record types.
//!
//! Raw form inputs arrive as text keyed by column name. The assembler turns
//! them into an [`OrderedRecord`] whose columns follow the order the model
//! was trained with.

/// Raw input to ordered record conversion.
pub mod assembler;
/// CSV export of an assembled record.
pub mod export;
/// Fixed patient field schema.
pub mod schema;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Single typed value of a patient field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric input, always stored as `f64`.
    Number(f64),
    /// Categorical input.
    Category(String),
}

impl FieldValue {
    /// Returns the number if this is a numeric value.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Category(_) => None,
        }
    }

    /// Returns the category if this is a categorical value.
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Category(value) => Some(value),
            Self::Number(_) => None,
        }
    }
}

/// Untyped form submission keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputs(IndexMap<String, String>);

impl RawInputs {
    /// Creates an empty submission.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style [`RawInputs::insert`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Removes a field.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.shift_remove(field)
    }

    /// Returns the submitted text for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInputs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Validated single-row record in model column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderedRecord {
    fields: IndexMap<String, FieldValue>,
}

impl OrderedRecord {
    pub(crate) const fn from_fields(fields: IndexMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// Column names in model order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Columns with their values, in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Numeric value of a column.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(FieldValue::as_number)
    }

    /// Categorical value of a column.
    #[must_use]
    pub fn category(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_category)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record holds no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
