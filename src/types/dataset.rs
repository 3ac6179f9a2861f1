//! Group index and dataset snapshot types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::Record;

/// Free-form metadata block shipped alongside a dataset (`generatedAt`,
/// `source`, `count_*` ...).
pub type Meta = Map<String, Value>;

/// One entry of the group index. Derived from records, never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub count: usize,
}

impl Group {
    #[must_use]
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            label: name,
            count,
        }
    }
}

/// A dataset snapshot: records in display order, their group index, the
/// metadata it shipped with, and the timestamp shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub groups: Vec<Group>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// `generatedAt` for the baseline, `savedAt` once an override is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Dataset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reads `meta.generatedAt` when it is a non-empty string.
    #[must_use]
    pub fn generated_at(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.get("generatedAt"))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}
