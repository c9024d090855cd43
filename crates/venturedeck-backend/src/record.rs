//! Startup-like entity record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form JSON fields of a record.
pub type Fields = Map<String, Value>;

/// An entity with a string identity and arbitrary JSON-serializable fields.
///
/// Serializes flat: `{"id": "s_...", "title": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Build a record. An `id` key inside `fields` is dropped; identity
    /// comes only from `id`.
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Field lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field lookup.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Shallow merge: top-level keys in `patch` overwrite existing ones,
    /// nested objects are replaced, not merged. `id` is never changed.
    pub fn merge(&mut self, patch: Fields) {
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            self.fields.insert(key, value);
        }
    }
}

/// Convert a JSON value into record fields. Non-objects yield no fields.
pub fn into_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}
