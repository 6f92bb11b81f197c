use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::schema::ContentSchema;

/// One page's editable content.
///
/// String values of the active schema's fields live in `fields`; every other
/// stored entry (fields dropped from the schema, non-string values written by
/// the raw editor) is kept verbatim in `extra` and written back on save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentDocument {
    fields: BTreeMap<String, String>,
    extra: Map<String, Value>,
}

impl ContentDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Split a stored JSON object against `schema`.
    pub fn from_stored(value: Map<String, Value>, schema: &ContentSchema) -> Self {
        let mut doc = Self::default();
        for (key, value) in value {
            match value {
                Value::String(s) if schema.field(&key).is_some() => {
                    doc.fields.insert(key, s);
                }
                other => {
                    doc.extra.insert(key, other);
                }
            }
        }
        doc
    }

    /// Current value of a declared field; empty when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Set one field, leaving every other key alone.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.extra.remove(&key);
        self.fields.insert(key, value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key) || self.extra.contains_key(key)
    }

    /// Entries carried through untouched.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extra.is_empty()
    }

    /// The whole document as stored: extra entries overlaid by field values.
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        for (key, value) in &self.fields {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

impl Serialize for ContentDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
