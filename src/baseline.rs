//! The shipped baseline, read from (and written as) a data-source file:
//!
//! ```text
//! // comment header
//!
//! window.PHONEBOOK_DATA = <json>;
//!
//! window.PHONEBOOK_META = <json>;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{RawDataset, normalize};
use crate::types::{Dataset, Meta};
use crate::{PhonebookError, Result};

const DATA_ASSIGNMENT: &str = "window.PHONEBOOK_DATA";
const META_ASSIGNMENT: &str = "window.PHONEBOOK_META";

/// Baseline payload and metadata before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSource {
    pub data: Value,
    pub meta: Option<Meta>,
}

impl DataSource {
    /// `meta` is kept only when it is an object.
    #[must_use]
    pub fn new(data: Value, meta: Option<Value>) -> Self {
        let meta = match meta {
            Some(Value::Object(meta)) => Some(meta),
            _ => None,
        };
        Self { data, meta }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Value::Array(Vec::new()), None)
    }

    /// Normalizes the payload, degrading to an empty dataset on an
    /// unrecognized shape.
    #[must_use]
    pub fn to_dataset(&self) -> Dataset {
        normalize(
            RawDataset::from_value_lenient(self.data.clone()),
            self.meta.clone(),
        )
    }
}

/// Parses a data-source file.
///
/// The data assignment is required and its right-hand side must be JSON.
/// The meta assignment is optional; a meta value that is not a JSON object
/// is dropped. Assignments only count at the start of a line, so the names
/// may appear in comments.
pub fn parse_data_source(text: &str) -> Result<DataSource> {
    let rhs = find_assignment(text, DATA_ASSIGNMENT).ok_or_else(|| {
        PhonebookError::InvalidBaseline {
            reason: format!("no {DATA_ASSIGNMENT} assignment found"),
        }
    })?;
    let data = read_value(rhs).map_err(|err| PhonebookError::InvalidBaseline {
        reason: format!("{DATA_ASSIGNMENT}: {err}"),
    })?;
    let meta = find_assignment(text, META_ASSIGNMENT).and_then(|rhs| match read_value(rhs) {
        Ok(meta) => Some(meta),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable {META_ASSIGNMENT}");
            None
        }
    });
    tracing::debug!(
        baseline.bytes = text.len(),
        baseline.has_meta = meta.is_some(),
        "data source parsed"
    );
    Ok(DataSource::new(data, meta))
}

/// Renders a data-source file: `header`, then the data and meta assignments
/// pretty-printed with two-space indentation.
pub fn render_data_source(header: &str, data: &impl Serialize, meta: &Meta) -> Result<String> {
    let data = serde_json::to_string_pretty(data)?;
    let meta = serde_json::to_string_pretty(meta)?;
    Ok(format!(
        "{header}\n{DATA_ASSIGNMENT} = {data};\n\n{META_ASSIGNMENT} = {meta};\n"
    ))
}

/// Text following `target =` on the first line that starts (after
/// indentation) with that assignment, running to the end of the file.
///
/// JSON strings cannot hold raw newlines, so a line of a pretty-printed
/// value never starts with the assignment name.
fn find_assignment<'t>(text: &'t str, target: &str) -> Option<&'t str> {
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let body = line.trim_start();
        if let Some(rhs) = body
            .strip_prefix(target)
            .and_then(|rest| rest.trim_start().strip_prefix('='))
        {
            return Some(&text[line_start + line.len() - rhs.len()..]);
        }
        line_start += line.len();
    }
    None
}

/// Reads the single JSON value at the start of `rhs`. Whatever follows it
/// (the closing `;`, the next statement) is left unread.
fn read_value(rhs: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(rhs);
    Value::deserialize(&mut deserializer)
}
