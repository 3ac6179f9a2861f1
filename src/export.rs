//! Admin exports: the raw working list as JSON, and a regenerated baseline
//! data source that the next deployment can ship.

use serde_json::{Map, Value};

use crate::baseline::render_data_source;
use crate::constants::{GROUP_FIELD, META_KEY, UNCATEGORIZED_GROUP};
use crate::types::{Meta, Record};
use crate::Result;

/// `source` stamped into metadata of admin exports.
pub const EXPORT_SOURCE: &str = "Admin Panel";

/// Bucket name used for a group literally named `meta`, which would
/// otherwise be read back as the metadata entry.
pub const RENAMED_META_GROUP: &str = "meta (group)";

const TOTAL_KEYS: [&str; 3] = ["count", "count_actual", "count_declared"];

/// The exact working list, pretty-printed.
pub fn export_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Grouped payload plus metadata for a data-source export.
///
/// Records are bucketed by trimmed group name in first-seen order, with the
/// group field removed. Records without a group go under
/// [`UNCATEGORIZED_GROUP`] when at least one group exists; if none does the
/// payload stays a flat list. A group named `meta` is exported as
/// [`RENAMED_META_GROUP`]. Metadata starts from `meta` minus every
/// `count_*` key and gets fresh counts; the record totals win over a
/// per-group count with the same key.
#[must_use]
pub fn export_payload(records: &[Record], meta: Option<&Meta>, saved_at: &str) -> (Value, Meta) {
    let mut meta: Meta = meta
        .map(|meta| {
            meta.iter()
                .filter(|(key, _)| !key.starts_with("count_"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default();
    let total = records.len();
    meta.insert("generatedAt".into(), Value::from(saved_at));
    meta.insert("source".into(), Value::from(EXPORT_SOURCE));
    insert_totals(&mut meta, total);

    let mut buckets: Vec<(String, Vec<Value>)> = Vec::new();
    let mut uncategorized: Vec<Value> = Vec::new();
    let mut renamed_meta = 0_usize;
    for record in records {
        let mut name = record.get(GROUP_FIELD).unwrap_or_default().trim().to_string();
        let mut record = record.clone();
        if name.is_empty() {
            uncategorized.push(record.to_value());
            continue;
        }
        if name == META_KEY {
            renamed_meta += 1;
            name = RENAMED_META_GROUP.to_string();
        }
        record.remove(GROUP_FIELD);
        match buckets.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, bucket)) => bucket.push(record.to_value()),
            None => buckets.push((name, vec![record.to_value()])),
        }
    }

    if renamed_meta > 0 {
        tracing::warn!(
            export.records = renamed_meta,
            export.renamed_to = RENAMED_META_GROUP,
            "group name collides with the metadata key; renamed on export"
        );
    }

    if buckets.is_empty() {
        let flat = records.iter().map(Record::to_value).collect();
        return (Value::Array(flat), meta);
    }

    for (name, bucket) in &buckets {
        let key = format!("count_{name}");
        if TOTAL_KEYS.contains(&key.as_str()) {
            tracing::warn!(
                export.group = %name,
                "group count key collides with a record total; keeping the total"
            );
            continue;
        }
        meta.insert(key, Value::from(bucket.len()));
    }
    if !uncategorized.is_empty() {
        match buckets
            .iter_mut()
            .find(|(existing, _)| existing == UNCATEGORIZED_GROUP)
        {
            Some((_, bucket)) => bucket.extend(uncategorized),
            None => buckets.push((UNCATEGORIZED_GROUP.to_string(), uncategorized)),
        }
        let count = buckets
            .iter()
            .find(|(existing, _)| existing == UNCATEGORIZED_GROUP)
            .map_or(0, |(_, bucket)| bucket.len());
        meta.insert(format!("count_{UNCATEGORIZED_GROUP}"), Value::from(count));
    }

    let grouped: Map<String, Value> = buckets
        .into_iter()
        .map(|(name, bucket)| (name, Value::Array(bucket)))
        .collect();
    (Value::Object(grouped), meta)
}

fn insert_totals(meta: &mut Meta, total: usize) {
    for key in TOTAL_KEYS {
        meta.insert(key.into(), Value::from(total));
    }
}

/// Renders a complete data-source file for the working list.
pub fn export_data_source(records: &[Record], meta: Option<&Meta>, saved_at: &str) -> Result<String> {
    let (payload, meta) = export_payload(records, meta, saved_at);
    let header = format!(
        "// Phone book data (exported from Admin Panel)\n\
         // Replace your mobile/phonebook_data.js with this file.\n\
         // Generated: {saved_at}\n"
    );
    render_data_source(&header, &payload, &meta)
}
