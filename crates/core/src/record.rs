use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

static NULL: Value = Value::Null;

/// One row of host data: field name -> value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Value of a field; missing fields read as `Null`.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build from a JSON object. Returns None for any other JSON shape.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let object = json.as_object()?;
        let fields = object
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect();
        Some(Self { fields })
    }

    /// Identity key of this record under `data_key`.
    pub fn key(&self, data_key: &str) -> RowKey {
        RowKey::for_record(self, data_key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Stable row identity. Never a row index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key from the identity field, or a snapshot of the whole record when
    /// the field is absent or null.
    pub fn for_record(record: &Record, data_key: &str) -> Self {
        match record.get(data_key) {
            Value::Null => Self::snapshot(record),
            value => Self(value.to_text()),
        }
    }

    /// Snapshot identity: canonical JSON of the record (fields are sorted).
    pub fn snapshot(record: &Record) -> Self {
        let json = serde_json::to_string(record).unwrap_or_default();
        Self(format!("#{json}"))
    }

    pub fn is_snapshot(&self) -> bool {
        self.0.starts_with("#{")
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for RowKey {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}
