//! Persisted full replacement for the baseline dataset.
//!
//! The payload is always the entire record list, never a delta, stored as
//! `{"data": [...], "savedAt": "<ISO-8601>"}` under one store key.

use serde::Serialize;
use serde_json::Value;

use crate::clock::iso_timestamp;
use crate::constants::STORAGE_OVERRIDE_KEY;
use crate::store::KvStore;
use crate::types::Record;
use crate::{PhonebookError, Result};

/// A decoded override.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverridePayload {
    pub data: Vec<Record>,
    #[serde(rename = "savedAt", skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    data: &'a [Record],
    #[serde(rename = "savedAt")]
    saved_at: &'a str,
}

pub struct OverrideStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> OverrideStore<'a> {
    #[must_use]
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Persists `records` stamped with `now_ms`.
    ///
    /// On error the previously stored override, if any, is left untouched.
    pub fn save(&self, records: &[Record], now_ms: i64) -> Result<OverridePayload> {
        let saved_at = iso_timestamp(now_ms);
        let payload = serde_json::to_string(&PayloadRef {
            data: records,
            saved_at: &saved_at,
        })?;
        self.store.set(STORAGE_OVERRIDE_KEY, &payload)?;
        tracing::info!(
            override.records = records.len(),
            override.bytes = payload.len(),
            "override saved"
        );
        Ok(OverridePayload {
            data: records.to_vec(),
            saved_at: Some(saved_at),
        })
    }

    /// The stored override, or `None` when absent, unreadable, or malformed.
    #[must_use]
    pub fn load(&self) -> Option<OverridePayload> {
        let raw = match self.store.get(STORAGE_OVERRIDE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "override unreadable; using baseline");
                return None;
            }
        };
        match decode(&raw) {
            Ok(payload) => {
                tracing::debug!(override.records = payload.data.len(), "override loaded");
                Some(payload)
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring stored override");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(STORAGE_OVERRIDE_KEY)?;
        tracing::info!("override cleared");
        Ok(())
    }
}

fn decode(raw: &str) -> Result<OverridePayload> {
    let malformed = |reason: &str| PhonebookError::MalformedPersistedState {
        key: STORAGE_OVERRIDE_KEY.to_string(),
        reason: reason.to_string(),
    };
    let value: Value = serde_json::from_str(raw).map_err(|err| malformed(&err.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(malformed("payload is not an object"));
    };
    let Some(Value::Array(items)) = object.remove("data") else {
        return Err(malformed("missing data list"));
    };
    let data = items
        .into_iter()
        .map(Record::from_value)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| malformed("data list holds a non-object entry"))?;
    let saved_at = match object.remove("savedAt") {
        Some(Value::String(text)) => Some(text),
        _ => None,
    };
    Ok(OverridePayload { data, saved_at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sample() -> Vec<Record> {
        vec![
            [("Name", "Rahim"), ("__group", "Physics")].into_iter().collect(),
            [("Name", "Karim")].into_iter().collect(),
        ]
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let overrides = OverrideStore::new(&store);
        assert_eq!(overrides.load(), None);

        let saved = overrides.save(&sample(), 0).unwrap();
        assert_eq!(saved.saved_at.as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(overrides.load(), Some(saved));
        assert!(
            store
                .peek(STORAGE_OVERRIDE_KEY)
                .unwrap()
                .starts_with(r#"{"data":[{"Name":"Rahim","__group":"Physics"}"#)
        );
    }

    #[test]
    fn save_after_delete_does_not_resurrect() {
        let store = MemoryStore::new();
        let overrides = OverrideStore::new(&store);
        let mut records = sample();
        overrides.save(&records, 0).unwrap();
        records.remove(0);
        overrides.save(&records, 1).unwrap();
        assert_eq!(overrides.load().unwrap().data, records);
    }

    #[test]
    fn malformed_payloads_read_as_absent() {
        let store = MemoryStore::new();
        let overrides = OverrideStore::new(&store);
        for raw in [
            "not json",
            "[]",
            r#"{"savedAt":"x"}"#,
            r#"{"data":{"a":[]}}"#,
            r#"{"data":[{"Name":"a"}, 3]}"#,
        ] {
            store.set(STORAGE_OVERRIDE_KEY, raw).unwrap();
            assert_eq!(overrides.load(), None, "{raw}");
        }
    }

    #[test]
    fn non_string_saved_at_is_dropped() {
        let store = MemoryStore::new();
        store
            .set(STORAGE_OVERRIDE_KEY, r#"{"data":[],"savedAt":12}"#)
            .unwrap();
        let payload = OverrideStore::new(&store).load().unwrap();
        assert!(payload.data.is_empty());
        assert_eq!(payload.saved_at, None);
    }

    #[test]
    fn failed_save_keeps_previous_override() {
        let store = MemoryStore::new();
        let overrides = OverrideStore::new(&store);
        let first = overrides.save(&sample(), 0).unwrap();

        store.set_available(false);
        let err = overrides.save(&[], 5).unwrap_err();
        assert_eq!(err.code(), "storage_unavailable");
        assert_eq!(overrides.load(), None);
        assert!(overrides.clear().is_err());

        store.set_available(true);
        assert_eq!(overrides.load(), Some(first));
        overrides.clear().unwrap();
        assert_eq!(overrides.load(), None);
    }
}
