//! Reconciles the two accepted data shapes into one canonical dataset.
//!
//! A payload is either a flat list of records, or an object mapping group
//! names to lists of records (with an optional reserved `meta` entry). The
//! shape is resolved once, into [`RawDataset`], and everything downstream
//! works on the flattened [`Dataset`].

use serde_json::Value;

use crate::constants::META_KEY;
use crate::text::natural_cmp;
use crate::types::{Dataset, Group, Meta, Record};
use crate::{PhonebookError, Result};

/// A payload whose shape has been identified but not yet flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDataset {
    /// `[record, ...]`
    List(Vec<Record>),
    /// `{ "<group>": [record, ...], ..., "meta": {...} }` in key order.
    Grouped {
        buckets: Vec<(String, Vec<Record>)>,
        meta: Option<Meta>,
    },
}

impl RawDataset {
    /// Strict shape resolution for imported payloads.
    ///
    /// Rejects anything that is not a list of objects or an object holding at
    /// least one list of objects.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self::List(strict_records(items, None)?)),
            Value::Object(object) => {
                let mut buckets = Vec::new();
                let mut meta = None;
                for (key, value) in object {
                    if key == META_KEY {
                        if let Value::Object(embedded) = value {
                            meta = Some(embedded);
                        }
                        continue;
                    }
                    if let Value::Array(items) = value {
                        let records = strict_records(items, Some(&key))?;
                        buckets.push((key, records));
                    }
                }
                if buckets.is_empty() {
                    return Err(PhonebookError::import(
                        "object has no group lists of records",
                    ));
                }
                Ok(Self::Grouped { buckets, meta })
            }
            other => Err(PhonebookError::import(format!(
                "expected a list of records or an object of groups, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Forgiving shape resolution for the shipped baseline.
    ///
    /// Non-object list entries are skipped and an unrecognized shape becomes
    /// an empty list; both are logged.
    #[must_use]
    pub fn from_value_lenient(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(lenient_records(items, None)),
            Value::Object(object) => {
                let mut buckets = Vec::new();
                let mut meta = None;
                for (key, value) in object {
                    if key == META_KEY {
                        if let Value::Object(embedded) = value {
                            meta = Some(embedded);
                        }
                        continue;
                    }
                    if let Value::Array(items) = value {
                        let records = lenient_records(items, Some(&key));
                        buckets.push((key, records));
                    }
                }
                Self::Grouped { buckets, meta }
            }
            other => {
                tracing::warn!(
                    baseline.kind = json_kind(&other),
                    "unrecognized baseline shape; starting with an empty dataset"
                );
                Self::List(Vec::new())
            }
        }
    }
}

/// Flattens a payload into records, group index, and meta.
///
/// Grouped input stamps each record's group field with its bucket name
/// unless the record already names a group, and its group index comes from
/// the bucket keys in order with counts equal to bucket length. List input
/// gets its group index from [`compute_groups`]. An explicit `meta` wins over
/// one embedded in the payload.
#[must_use]
pub fn normalize(raw: RawDataset, meta: Option<Meta>) -> Dataset {
    let (records, groups, meta) = match raw {
        RawDataset::List(records) => {
            let groups = compute_groups(&records);
            (records, groups, meta)
        }
        RawDataset::Grouped {
            buckets,
            meta: embedded,
        } => {
            let mut records = Vec::with_capacity(buckets.iter().map(|(_, b)| b.len()).sum());
            let mut groups = Vec::with_capacity(buckets.len());
            for (key, bucket) in buckets {
                groups.push(Group::new(key.clone(), bucket.len()));
                for mut record in bucket {
                    if record.group().is_none() {
                        record.set_group(key.clone());
                    }
                    records.push(record);
                }
            }
            (records, groups, meta.or(embedded))
        }
    };

    let mut dataset = Dataset {
        records,
        groups,
        meta,
        updated_at: None,
    };
    dataset.updated_at = dataset.generated_at().map(str::to_string);
    tracing::debug!(
        normalize.records = dataset.records.len(),
        normalize.groups = dataset.groups.len(),
        "dataset normalized"
    );
    dataset
}

/// Counts records per non-empty group name and orders the result by label,
/// naturally and case-insensitively. Groupless records are not counted.
#[must_use]
pub fn compute_groups(records: &[Record]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for group in records.iter().filter_map(Record::group) {
        match groups.iter_mut().find(|existing| existing.id == group) {
            Some(existing) => existing.count += 1,
            None => groups.push(Group::new(group, 1)),
        }
    }
    groups.sort_by(|a, b| natural_cmp(&a.label, &b.label));
    groups
}

fn strict_records(items: Vec<Value>, bucket: Option<&str>) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Record::from_value(item).ok_or_else(|| match bucket {
                Some(name) => {
                    PhonebookError::import(format!("entry {index} of group '{name}' is not an object"))
                }
                None => PhonebookError::import(format!("entry {index} is not an object")),
            })
        })
        .collect()
}

fn lenient_records(items: Vec<Value>, bucket: Option<&str>) -> Vec<Record> {
    let total = items.len();
    let records: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
    if records.len() != total {
        tracing::warn!(
            baseline.group = bucket.unwrap_or_default(),
            baseline.skipped = total - records.len(),
            "skipped non-object baseline entries"
        );
    }
    records
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GROUP_FIELD;
    use serde_json::json;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn list_shape_passes_through() {
        let raw = RawDataset::from_value(json!([
            {"Name": "A", "__group": "Physics"},
            {"Name": "B"},
            {"Name": "C", "__group": "Chemistry"},
            {"Name": "D", "__group": "Physics"},
        ]))
        .unwrap();
        let dataset = normalize(raw, None);
        assert_eq!(dataset.records.len(), 4);
        assert_eq!(dataset.records[1].group(), None);
        assert_eq!(
            dataset.groups,
            vec![Group::new("Chemistry", 1), Group::new("Physics", 2)]
        );
        assert_eq!(dataset.meta, None);
    }

    #[test]
    fn grouped_shape_matches_manual_tagging() {
        let raw = RawDataset::from_value(json!({
            "A": [{"Name": "r1"}],
            "B": [{"Name": "r2"}],
        }))
        .unwrap();
        let grouped = normalize(raw, None);

        let manual = vec![
            record(&[("Name", "r1"), (GROUP_FIELD, "A")]),
            record(&[("Name", "r2"), (GROUP_FIELD, "B")]),
        ];
        assert_eq!(grouped.records, manual);
        assert_eq!(grouped.groups, compute_groups(&manual));
    }

    #[test]
    fn grouped_shape_keeps_key_order_and_bucket_counts() {
        let raw = RawDataset::from_value(json!({
            "Zoology": [{"Name": "z1"}, {"Name": "z2", "__group": "Botany"}],
            "meta": {"generatedAt": "2024-01-01T00:00:00.000Z", "count": 3},
            "Botany": [{"Name": "b1"}],
            "notes": "ignored",
        }))
        .unwrap();
        let dataset = normalize(raw, None);
        assert_eq!(
            dataset.groups,
            vec![Group::new("Zoology", 2), Group::new("Botany", 1)]
        );
        assert_eq!(dataset.records[1].group(), Some("Botany"));
        assert_eq!(dataset.updated_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn explicit_meta_wins_over_embedded() {
        let raw = RawDataset::from_value(json!({
            "A": [],
            "meta": {"source": "embedded"},
        }))
        .unwrap();
        let explicit: Meta = json!({"source": "explicit"}).as_object().cloned().unwrap();
        let dataset = normalize(raw, Some(explicit.clone()));
        assert_eq!(dataset.meta, Some(explicit));
        assert_eq!(dataset.groups, vec![Group::new("A", 0)]);
    }

    #[test]
    fn normalize_is_idempotent_on_list_output() {
        let input = json!([
            {"Name": "Class 10 teacher", "__group": "Class 10"},
            {"Name": "Class 2 teacher", "__group": "Class 2"},
            {"Name": "Floater"},
        ]);
        let once = normalize(RawDataset::from_value(input).unwrap(), None);
        let twice = normalize(RawDataset::List(once.records.clone()), None);
        assert_eq!(once, twice);
        assert_eq!(once.groups[0].id, "Class 2");
    }

    #[test]
    fn strict_resolution_rejects_bad_shapes() {
        for bad in [
            json!("text"),
            json!(42),
            json!(null),
            json!({}),
            json!({"meta": {"count": 1}}),
            json!({"meta": [{"Name": "not a group"}]}),
            json!([{"Name": "ok"}, "not a record"]),
            json!({"A": [1, 2]}),
        ] {
            let err = RawDataset::from_value(bad.clone()).unwrap_err();
            assert_eq!(err.code(), "import_rejected", "{bad}");
        }
        assert_eq!(
            RawDataset::from_value(json!([])).unwrap(),
            RawDataset::List(Vec::new())
        );
    }

    #[test]
    fn lenient_resolution_degrades() {
        assert_eq!(
            RawDataset::from_value_lenient(json!("text")),
            RawDataset::List(Vec::new())
        );
        let RawDataset::List(records) =
            RawDataset::from_value_lenient(json!([{"Name": "a"}, 5, {"Name": "b"}]))
        else {
            panic!("expected list shape");
        };
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_group_names_are_not_counted() {
        let records = vec![
            record(&[(GROUP_FIELD, "")]),
            record(&[(GROUP_FIELD, "x")]),
            record(&[]),
        ];
        assert_eq!(compute_groups(&records), vec![Group::new("x", 1)]);
    }
}
