//! Field-name discovery and role detection.
//!
//! Record field names come from whoever built the sheet, in English or
//! Bengali, so roles are found by case-insensitive substring match.

use crate::constants::{KEY_SCAN_LIMIT, PHOTO_FIELD};
use crate::text::natural_cmp;
use crate::types::Record;

const ID_PATTERNS: &[&str] = &["id", "আইডি", "পিডিএস"];
const NAME_PATTERNS: &[&str] = &["name", "নাম"];
const NAME_FALLBACK_PATTERNS: &[&str] = &["teacher"];
const PHONE_PATTERNS: &[&str] = &[
    "phone", "mobile", "tel", "contact", "cell", "ফোন", "মোবাইল", "নম্বর", "নং",
];
const EMAIL_PATTERNS: &[&str] = &["email", "e-mail", "ই-মেইল", "মেইল"];
const SUBJECT_PATTERNS: &[&str] = &["subject", "department", "dept", "বিষয়", "বিভাগ"];
const DESIGNATION_PATTERNS: &[&str] = &["designation", "পদবি"];
const PHOTO_PATTERNS: &[&str] = &["photo", "image", "picture", "ছবি"];

/// Union of field names over the first records, in natural order.
#[must_use]
pub fn collect_keys(records: &[Record]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records.iter().take(KEY_SCAN_LIMIT) {
        for name in record.field_names() {
            if !keys.iter().any(|key| key == name) {
                keys.push(name.to_string());
            }
        }
    }
    keys.sort_by(|a, b| natural_cmp(a, b));
    keys
}

/// First key containing any pattern, trying patterns in priority order.
#[must_use]
pub fn find_key<'a>(keys: &'a [String], patterns: &[&str]) -> Option<&'a str> {
    let lowered: Vec<String> = keys.iter().map(|key| key.trim().to_lowercase()).collect();
    patterns.iter().find_map(|pattern| {
        lowered
            .iter()
            .position(|key| key.contains(pattern))
            .map(|index| keys[index].as_str())
    })
}

/// Keeps digits, plus one leading `+`.
#[must_use]
pub fn sanitize_phone(value: &str) -> String {
    let mut out = String::new();
    for c in value.trim().chars() {
        if c.is_ascii_digit() || (c == '+' && out.is_empty()) {
            out.push(c);
        }
    }
    out
}

/// Which field plays which role in the current dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRoles {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub designation: Option<String>,
    pub photo: Option<String>,
}

impl FieldRoles {
    /// Detects roles from a key list as produced by [`collect_keys`].
    ///
    /// The name role falls back to the first key when nothing matches.
    #[must_use]
    pub fn detect(keys: &[String]) -> Self {
        let find = |patterns: &[&str]| find_key(keys, patterns).map(str::to_string);
        let name = find(NAME_PATTERNS)
            .or_else(|| find(NAME_FALLBACK_PATTERNS))
            .or_else(|| keys.first().cloned());
        let photo = find(PHOTO_PATTERNS).or_else(|| {
            keys.iter()
                .any(|key| key == PHOTO_FIELD)
                .then(|| PHOTO_FIELD.to_string())
        });
        Self {
            id: find(ID_PATTERNS),
            name,
            phone: find(PHONE_PATTERNS),
            email: find(EMAIL_PATTERNS),
            subject: find(SUBJECT_PATTERNS),
            designation: find(DESIGNATION_PATTERNS),
            photo,
        }
    }

    #[must_use]
    pub fn for_records(records: &[Record]) -> Self {
        Self::detect(&collect_keys(records))
    }

    /// Name, else id, else a placeholder.
    #[must_use]
    pub fn display_name(&self, record: &Record) -> String {
        [self.name.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(|key| record.get(key))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or("(No name)")
            .to_string()
    }

    #[must_use]
    pub fn display_phone(&self, record: &Record) -> String {
        self.phone
            .as_deref()
            .and_then(|key| record.get(key))
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }

    /// Photo data URL from the detected photo field, else the reserved one.
    #[must_use]
    pub fn photo<'r>(&self, record: &'r Record) -> &'r str {
        self.photo
            .as_deref()
            .and_then(|key| record.get(key))
            .filter(|value| !value.is_empty())
            .or_else(|| record.get(PHOTO_FIELD))
            .unwrap_or_default()
            .trim()
    }
}
