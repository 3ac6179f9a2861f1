//! Directory record: an ordered map of origin-defined field names to strings.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::GROUP_FIELD;

/// One directory entry.
///
/// Field names are not fixed ahead of time; they come from whatever sheet or
/// JSON produced the data. Values are always strings. Field order is kept as
/// it appeared in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object, coercing every value to a string.
    ///
    /// `null` becomes the empty string, numbers and booleans use their JSON
    /// text, nested arrays/objects are kept as compact JSON text. Returns
    /// `None` when `value` is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(object) = value else {
            return None;
        };
        let fields = object
            .into_iter()
            .map(|(key, value)| (key, Value::String(coerce_to_string(value))))
            .collect();
        Some(Self { fields })
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), Value::String(value.into()));
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.shift_remove(field).map(coerce_to_string)
    }

    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str().unwrap_or_default()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Group membership, if the reserved group field is set and non-empty.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.get(GROUP_FIELD).filter(|group| !group.is_empty())
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.set(GROUP_FIELD, group);
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

fn coerce_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_coerces_scalars() {
        let record = Record::from_value(json!({
            "Name": "Rahim",
            "Serial": 12,
            "Active": true,
            "Photo": null,
        }))
        .unwrap();
        assert_eq!(record.get("Name"), Some("Rahim"));
        assert_eq!(record.get("Serial"), Some("12"));
        assert_eq!(record.get("Active"), Some("true"));
        assert_eq!(record.get("Photo"), Some(""));
        assert!(Record::from_value(json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn field_order_is_preserved() {
        let record = Record::from_value(json!({"b": "1", "a": "2", "c": "3"})).unwrap();
        assert_eq!(record.field_names().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"b":"1","a":"2","c":"3"}"#
        );
    }

    #[test]
    fn empty_group_counts_as_groupless() {
        let mut record: Record = [("Name", "Karim"), (GROUP_FIELD, "")].into_iter().collect();
        assert_eq!(record.group(), None);
        record.set_group("Physics");
        assert_eq!(record.group(), Some("Physics"));
        assert_eq!(record.remove(GROUP_FIELD).as_deref(), Some("Physics"));
        assert_eq!(record.group(), None);
    }
}
