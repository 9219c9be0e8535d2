//! In-memory representation of converted data.
//!
//! Every parser produces a list of [`DataRecord`]s and every writer consumes one.
//! A record is an ordered map of field names to dynamic [`FieldValue`]s; nested
//! objects and arrays are kept as-is so they survive JSON and XML round trips.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic field value: null, bool, number, string, array or object.
pub type FieldValue = serde_json::Value;

/// Ordered field map backing a [`DataRecord`].
pub type FieldMap = serde_json::Map<String, FieldValue>;

/// A single record: field names mapped to values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: FieldMap,
}

impl DataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: FieldMap) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn into_fields(self) -> FieldMap {
        self.fields
    }

    /// Inserts a field, replacing any previous value under the same name.
    pub fn add_field(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// `Some(&Value::Null)` for a field that is present but null.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn field_as_string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(value_to_string)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the record as owned [`DataField`]s.
    pub fn data_fields(&self) -> impl Iterator<Item = DataField> + '_ {
        self.fields
            .iter()
            .map(|(name, value)| DataField::new(name.clone(), value.clone()))
    }
}

impl From<FieldMap> for DataRecord {
    fn from(fields: FieldMap) -> Self {
        Self::from_fields(fields)
    }
}

impl FromIterator<DataField> for DataRecord {
    fn from_iter<I: IntoIterator<Item = DataField>>(iter: I) -> Self {
        let mut record = DataRecord::new();
        for field in iter {
            record.add_field(field.name, field.value);
        }
        record
    }
}

impl fmt::Display for DataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataRecord{{fields={}}}", FieldValue::Object(self.fields.clone()))
    }
}

/// A named value, used when a record is walked field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    name: String,
    value: FieldValue,
}

impl DataField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn set_value(&mut self, value: FieldValue) {
        self.value = value;
    }

    pub fn value_as_string(&self) -> Option<String> {
        value_to_string(&self.value)
    }

    pub fn into_parts(self) -> (String, FieldValue) {
        (self.name, self.value)
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataField{{name='{}', value={}}}", self.name, self.value)
    }
}

/// Text form of a value: `None` for null, strings verbatim, everything else as compact JSON.
pub fn value_to_string(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Null => None,
        FieldValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
