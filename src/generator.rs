//! Builds a baseline data source from a spreadsheet export.
//!
//! The expected workbook keeps one CSV line per row in the first column of a
//! sheet; a plain `.csv` file with the same content is accepted too. The
//! first row is the header row.

use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Reader as CalamineReader, Xlsx};
use serde_json::Value;

use crate::baseline::render_data_source;
use crate::types::{Meta, Record};
use crate::{PhonebookError, Result};

/// Header names and the non-empty records beneath them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRows {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Reads `.xlsx` (first sheet unless `sheet` is given) or `.csv` input.
pub fn read_source_rows(path: &Path, sheet: Option<&str>) -> Result<SourceRows> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let rows = match extension.as_str() {
        "xlsx" | "xlsm" => {
            let bytes = fs_err::read(path)?;
            let lines = read_xlsx_lines(&bytes, sheet)?;
            parse_rows(&lines.join("\n"))?
        }
        "csv" | "txt" => {
            let text = fs_err::read_to_string(path)?;
            parse_rows(&text)?
        }
        other => {
            return Err(source_error(format!(
                "unsupported input type '.{other}' (expected .xlsx or .csv)"
            )));
        }
    };
    tracing::info!(
        generator.input = %path.display(),
        generator.records = rows.records.len(),
        "source rows read"
    );
    Ok(rows)
}

/// Non-empty, trimmed first-column cells of the chosen sheet.
pub fn read_xlsx_lines(bytes: &[u8], sheet: Option<&str>) -> Result<Vec<String>> {
    let cursor = Cursor::new(bytes);
    let mut workbook = Xlsx::new(cursor)
        .map_err(|err| source_error(format!("failed to read xlsx workbook: {err}")))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| source_error("workbook has no sheets"))?,
    };
    let range = match workbook.worksheet_range(&sheet_name) {
        Some(Ok(range)) => range,
        Some(Err(err)) => {
            return Err(source_error(format!("failed to read sheet '{sheet_name}': {err}")));
        }
        None => return Err(source_error(format!("sheet '{sheet_name}' not found"))),
    };

    let mut lines = Vec::new();
    if let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) {
        for row in first_row..=last_row {
            let text = match range.get_value((row, 0)) {
                Some(DataType::String(s)) => s.trim().to_string(),
                Some(DataType::Float(v)) => format!("{v}"),
                Some(DataType::Int(v)) => format!("{v}"),
                Some(DataType::Bool(b)) => b.to_string(),
                Some(DataType::DateTimeIso(s) | DataType::DurationIso(s)) => s.trim().to_string(),
                Some(DataType::DateTime(v) | DataType::Duration(v)) => format!("{v}"),
                Some(DataType::Error(_) | DataType::Empty) | None => String::new(),
            };
            if !text.is_empty() {
                lines.push(text);
            }
        }
    }
    if lines.is_empty() {
        return Err(source_error("no rows found in the first column"));
    }
    Ok(lines)
}

/// Splits CSV text into header row and records.
///
/// Values are trimmed, short rows are padded with empty strings, and rows
/// with no non-empty value are dropped.
pub fn parse_rows(text: &str) -> Result<SourceRows> {
    let mut rows = split_csv(text).into_iter();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| source_error("no CSV rows found"))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(source_error("header row is empty"));
    }

    let mut records = Vec::new();
    for row in rows {
        let mut record = Record::new();
        for (index, header) in headers.iter().enumerate() {
            let value = row.get(index).map_or("", |value| value.trim());
            record.set(header.clone(), value);
        }
        if record.iter().any(|(_, value)| !value.is_empty()) {
            records.push(record);
        }
    }
    Ok(SourceRows { headers, records })
}

/// RFC 4180 style splitting: `"` quotes fields, `""` escapes a quote, and
/// quoted fields may span lines.
#[must_use]
pub fn split_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                row_started = false;
            }
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }
    if row_started || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Renders a generated baseline with meta `{generatedAt, source, count}`.
pub fn render_generated_source(
    records: &[Record],
    source_name: &str,
    generated_at: &str,
) -> Result<String> {
    let mut meta = Meta::new();
    meta.insert("generatedAt".into(), Value::from(generated_at));
    meta.insert("source".into(), Value::from(source_name));
    meta.insert("count".into(), Value::from(records.len()));
    let header = format!(
        "// Auto-generated file. You can edit it manually, but it may be overwritten by the generator.\n\
         // Source: {source_name}\n\
         // Generated: {generated_at}\n"
    );
    render_data_source(&header, &records, &meta)
}

fn source_error(reason: impl std::fmt::Display) -> PhonebookError {
    PhonebookError::InvalidBaseline {
        reason: reason.to_string(),
    }
}
