//! Privileged editing operations on the admin working copy.
//!
//! Every public method here checks the session first and fails with
//! `AdminRequired` when it is not active.

use serde_json::Value;

use crate::clock::iso_timestamp;
use crate::constants::PHOTO_FIELD;
use crate::export;
use crate::fields::collect_keys;
use crate::normalize::{RawDataset, normalize};
use crate::override_store::OverrideStore;
use crate::phonebook::lifecycle::{Phonebook, Workspace};
use crate::types::Record;
use crate::{PhonebookError, Result};

impl Workspace {
    fn new(records: Vec<Record>) -> Self {
        let mut keys = collect_keys(&records);
        if !keys.iter().any(|key| key == PHOTO_FIELD) {
            keys.push(PHOTO_FIELD.to_string());
        }
        Self { records, keys }
    }

    fn record_mut(&mut self, index: usize) -> Result<&mut Record> {
        self.records
            .get_mut(index)
            .ok_or(PhonebookError::RecordNotFound { index })
    }
}

impl Phonebook {
    /// Session check, then the working copy, created from the active
    /// dataset on first use.
    fn workspace(&mut self) -> Result<&mut Workspace> {
        self.require_admin()?;
        let active = &self.active;
        Ok(self
            .workspace
            .get_or_insert_with(|| Workspace::new(active.records.clone())))
    }

    /// The working copy.
    pub fn admin_records(&mut self) -> Result<&[Record]> {
        Ok(&self.workspace()?.records)
    }

    /// Field names offered for editing. Always includes the photo field.
    pub fn admin_keys(&mut self) -> Result<&[String]> {
        Ok(&self.workspace()?.keys)
    }

    /// Inserts a blank record at the front and returns its index.
    ///
    /// Every known field is present and empty, except the id-like field,
    /// which gets the current epoch ms, and the group field, which gets the
    /// first known group.
    pub fn add_record(&mut self) -> Result<usize> {
        let now = self.clock.now_ms();
        let id_key = self.roles.id.clone();
        let first_group = self.active.groups.first().map(|group| group.id.clone());
        let workspace = self.workspace()?;

        let mut record: Record = workspace
            .keys
            .iter()
            .map(|key| (key.clone(), String::new()))
            .collect();
        if let Some(id_key) = id_key {
            if record.get(&id_key) == Some("") {
                record.set(id_key, now.to_string());
            }
        }
        if let Some(group) = first_group {
            record.set_group(group);
        }
        workspace.records.insert(0, record);
        tracing::debug!(admin.records = workspace.records.len(), "record added");
        Ok(0)
    }

    /// Writes trimmed `fields` into the record at `index`.
    pub fn update_record<K, V>(
        &mut self,
        index: usize,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()>
    where
        K: Into<String>,
        V: AsRef<str>,
    {
        let workspace = self.workspace()?;
        let record = workspace.record_mut(index)?;
        let mut added = Vec::new();
        for (key, value) in fields {
            let key = key.into();
            if !record.contains_field(&key) {
                added.push(key.clone());
            }
            record.set(key, value.as_ref().trim());
        }
        for key in added {
            if !workspace.keys.contains(&key) {
                workspace.keys.push(key);
            }
        }
        Ok(())
    }

    /// Removes and returns the record at `index`.
    pub fn delete_record(&mut self, index: usize) -> Result<Record> {
        let workspace = self.workspace()?;
        if index >= workspace.records.len() {
            return Err(PhonebookError::RecordNotFound { index });
        }
        let removed = workspace.records.remove(index);
        tracing::debug!(admin.records = workspace.records.len(), "record deleted");
        Ok(removed)
    }

    /// Stores an already-encoded image data URL in the photo field.
    pub fn set_photo(&mut self, index: usize, data_url: &str) -> Result<()> {
        let record = self.workspace()?.record_mut(index)?;
        record.set(PHOTO_FIELD, data_url.trim());
        Ok(())
    }

    pub fn clear_photo(&mut self, index: usize) -> Result<()> {
        let record = self.workspace()?.record_mut(index)?;
        record.set(PHOTO_FIELD, "");
        Ok(())
    }

    /// Persists the whole working copy as the override and makes it active.
    ///
    /// On a storage failure nothing changes: the previous override, the
    /// active dataset, and the working copy are all kept.
    pub fn save(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let records = self.workspace()?.records.clone();
        let payload = OverrideStore::new(self.store.as_ref()).save(&records, now)?;
        self.activate_override(payload);
        self.workspace = Some(Workspace::new(records));
        Ok(())
    }

    /// Pretty JSON of the working copy.
    pub fn export_json(&mut self) -> Result<String> {
        export::export_json(&self.workspace()?.records)
    }

    /// Data-source file for the working copy, stamped with the current time.
    pub fn export_data_source(&mut self) -> Result<String> {
        let saved_at = iso_timestamp(self.clock.now_ms());
        let meta = self.baseline.meta.clone();
        let workspace = self.workspace()?;
        export::export_data_source(&workspace.records, meta.as_ref(), &saved_at)
    }

    /// Replaces the working copy with an imported JSON payload.
    ///
    /// Accepts either data shape, bare or wrapped as `{"data": ...}`. On any
    /// error the working copy is left as it was. Returns the record count.
    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        self.require_admin()?;
        let parsed: Value = serde_json::from_str(text)
            .map_err(|err| PhonebookError::import(format!("invalid JSON: {err}")))?;
        let payload = unwrap_data(parsed);
        let dataset = normalize(RawDataset::from_value(payload)?, None);
        let count = dataset.records.len();
        self.workspace = Some(Workspace::new(dataset.records));
        tracing::info!(admin.imported = count, "working copy replaced by import");
        Ok(count)
    }

    /// Clears the override and makes the baseline active again.
    pub fn reset(&mut self) -> Result<()> {
        self.require_admin()?;
        OverrideStore::new(self.store.as_ref()).clear()?;
        self.reload();
        Ok(())
    }
}

/// `{"data": <list or groups>, ...}` unwraps to its `data`.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut object)
            if matches!(object.get("data"), Some(Value::Array(_) | Value::Object(_))) =>
        {
            object.remove("data").unwrap_or_default()
        }
        other => other,
    }
}
