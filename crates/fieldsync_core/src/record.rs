//! Records and record identifiers.
//!
//! A [`Record`] is a JSON object. Every record stored in a collection is
//! identified by its `id` field, which is either an integer (assigned by
//! auto-increment collections) or a string (composite or fixed keys such as
//! `"7_2024-03-01"` or `"sales.remoteId"`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the identifier field carried by every record.
pub const ID_FIELD: &str = "id";

/// Identifier of a record within its collection.
///
/// Ordering puts every integer before every string, matching the key order
/// of the browser store the data originates from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer identifier (auto-assigned).
    Int(i64),
    /// String identifier (composite or fixed key).
    Text(String),
}

impl RecordId {
    /// Interprets a JSON value as an identifier.
    ///
    /// Only integers representable as `i64` and strings qualify; `null`,
    /// floats, booleans, arrays and objects are not identifiers.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// Converts the identifier back into a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }

    /// Returns the integer form, if this is an integer id.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RecordId::Int(n) => Some(*n),
            RecordId::Text(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

/// A record: a JSON object of field name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds a record from a JSON value, if it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Serializes any serde type into a record.
    ///
    /// # Errors
    ///
    /// Fails if the value does not serialize to a JSON object.
    pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(serde::ser::Error::custom(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Deserializes the record into a serde type.
    ///
    /// # Errors
    ///
    /// Fails if the fields don't match `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    /// Returns the record identifier, if the `id` field holds a valid one.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// Returns true if the `id` field is absent or `null`.
    #[must_use]
    pub fn has_no_id(&self) -> bool {
        matches!(self.0.get(ID_FIELD), None | Some(Value::Null))
    }

    /// Sets the identifier field.
    pub fn set_id(&mut self, id: &RecordId) {
        self.0.insert(ID_FIELD.to_string(), id.to_value());
    }

    /// Returns a copy of this record without its `id` field.
    #[must_use]
    pub fn without_id(&self) -> Self {
        let mut map = self.0.clone();
        map.remove(ID_FIELD);
        Self(map)
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a field value, returning the previous one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns true if `field` holds `value`.
    #[must_use]
    pub fn field_equals(&self, field: &str, value: &Value) -> bool {
        self.0.get(field) == Some(value)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the record into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
