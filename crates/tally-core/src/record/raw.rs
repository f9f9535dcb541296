//! The ordered raw property map backing every model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DataError;

/// An API object stored as an ordered map of field name to raw JSON.
///
/// This type guarantees that:
/// - The map is the only storage; typed accessors read and write through it
/// - Fields keep their insertion order, including fields no model declares
/// - Unknown fields survive a decode, mutate, encode round trip untouched
///
/// # Example
///
/// ```
/// use tally_core::record::RawRecord;
/// use serde_json::json;
///
/// let mut raw = RawRecord::from_value(json!({
///     "name": "Compute",
///     "x_future_field": [1, 2]
/// })).unwrap();
///
/// assert_eq!(raw.required::<String>("name").unwrap(), "Compute");
/// raw.set("name", &"Storage").unwrap();
///
/// let keys: Vec<_> = raw.keys().collect();
/// assert_eq!(keys, ["name", "x_future_field"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an existing JSON object map.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Create a record from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotAnObject`] if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, DataError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DataError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Read a required, non-nullable field.
    ///
    /// # Errors
    ///
    /// - [`DataError::MissingRequiredField`] if the key is absent
    /// - [`DataError::UnexpectedNull`] if the value is `null`
    /// - [`DataError::InvalidField`] if the value has the wrong shape
    pub fn required<T: DeserializeOwned>(&self, field: &str) -> Result<T, DataError> {
        match self.0.get(field) {
            None => Err(DataError::MissingRequiredField {
                field: field.to_string(),
            }),
            Some(Value::Null) => Err(DataError::UnexpectedNull {
                field: field.to_string(),
            }),
            Some(value) => decode_field(field, value),
        }
    }

    /// Read a field that must be present but may be `null`.
    pub fn nullable<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, DataError> {
        match self.0.get(field) {
            None => Err(DataError::MissingRequiredField {
                field: field.to_string(),
            }),
            Some(Value::Null) => Ok(None),
            Some(value) => decode_field(field, value).map(Some),
        }
    }

    /// Read an optional field. Absent and `null` both read as `None`.
    pub fn optional<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, DataError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode_field(field, value).map(Some),
        }
    }

    /// Serialize a value into a field, overwriting any previous content.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn set<T: Serialize + ?Sized>(&mut self, field: &str, value: &T) -> Result<(), DataError> {
        let value = serde_json::to_value(value).map_err(|source| DataError::Unserializable {
            field: field.to_string(),
            source,
        })?;
        self.insert(field, value);
        Ok(())
    }

    /// Store a raw JSON value under a field.
    pub fn insert(&mut self, field: &str, value: Value) {
        if let Some(slot) = self.0.get_mut(field) {
            *slot = value;
        } else {
            self.0.insert(field.to_string(), value);
        }
    }

    /// Remove a field, returning its raw value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Get the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns true if the field is present (even if `null`).
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterate field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a reference to the inner map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume and return the record as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Flatten the record into URL query pairs, in field order.
    ///
    /// Scalars are rendered as text, arrays as repeated `key[]` pairs, nested
    /// objects as `key[sub]` pairs. `null` values are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            flatten_query(key.clone(), value, &mut pairs);
        }
        pairs
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn decode_field<T: DeserializeOwned>(field: &str, value: &Value) -> Result<T, DataError> {
    T::deserialize(value).map_err(|source| DataError::InvalidField {
        field: field.to_string(),
        source,
    })
}

fn flatten_query(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for item in items {
                flatten_query(format!("{key}[]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_query(format!("{key}[{sub}]"), item, pairs);
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
