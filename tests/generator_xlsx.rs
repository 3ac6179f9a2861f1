//! Spreadsheet-driven baseline generation against small in-memory workbooks.

use std::io::{Cursor, Write};

use phonebook_core::{
    parse_data_source, read_source_rows, read_xlsx_lines, render_generated_source,
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Staff" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

/// Workbook with a single sheet named `Staff`; each line becomes a shared
/// string in column A. An empty line leaves its row blank. Column B of the
/// first row carries a stray note that must be ignored.
fn workbook(lines: &[&str]) -> Vec<u8> {
    let mut strings = String::new();
    let mut rows = String::new();
    let mut index = 0;
    for (row, line) in lines.iter().enumerate() {
        let r = row + 1;
        rows.push_str(&format!("<row r=\"{r}\">"));
        if !line.is_empty() {
            strings.push_str(&format!("<si><t xml:space=\"preserve\">{line}</t></si>"));
            rows.push_str(&format!("<c r=\"A{r}\" t=\"s\"><v>{index}</v></c>"));
            index += 1;
        }
        if r == 1 {
            strings.push_str("<si><t>note</t></si>");
            rows.push_str(&format!("<c r=\"B{r}\" t=\"s\"><v>{index}</v></c>"));
            index += 1;
        }
        rows.push_str("</row>");
    }
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<dimension ref="A1:B{}"/>
<sheetData>{rows}</sheetData>
</worksheet>"#,
        lines.len()
    );
    let shared = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{index}" uniqueCount="{index}">{strings}</sst>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ("xl/sharedStrings.xml", shared.as_str()),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn first_column_lines_are_read_and_blank_rows_skipped() {
    let bytes = workbook(&[
        "Name,Phone,Subject",
        "  Rahim Uddin,017, Physics  ",
        "",
        "Karim,018,Math",
    ]);
    let lines = read_xlsx_lines(&bytes, None).unwrap();
    assert_eq!(
        lines,
        vec!["Name,Phone,Subject", "Rahim Uddin,017, Physics", "Karim,018,Math"]
    );

    let named = read_xlsx_lines(&bytes, Some("Staff")).unwrap();
    assert_eq!(named, lines);
}

#[test]
fn unknown_sheet_is_an_invalid_baseline() {
    let bytes = workbook(&["Name", "Rahim"]);
    let err = read_xlsx_lines(&bytes, Some("Missing")).unwrap_err();
    assert_eq!(err.code(), "invalid_baseline");
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn workbook_file_generates_a_loadable_data_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("PhoneBook.xlsx");
    std::fs::write(
        &path,
        workbook(&["Name,Phone", "Rahim,017", "\"Karim, Jr.\",018", ","]),
    )
    .unwrap();

    let rows = read_source_rows(&path, None).unwrap();
    assert_eq!(rows.headers, vec!["Name", "Phone"]);
    assert_eq!(rows.records.len(), 2);
    assert_eq!(rows.records[1].get("Name"), Some("Karim, Jr."));

    let text =
        render_generated_source(&rows.records, "PhoneBook.xlsx", "2024-03-01T08:00:00.000Z")
            .unwrap();
    let dataset = parse_data_source(&text).unwrap().to_dataset();
    assert_eq!(dataset.records, rows.records);
    assert_eq!(dataset.updated_at.as_deref(), Some("2024-03-01T08:00:00.000Z"));
}

#[test]
fn csv_file_is_read_directly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("export.csv");
    std::fs::write(&path, "Name,Designation\r\nSalma,Lecturer\r\n").unwrap();

    let rows = read_source_rows(&path, None).unwrap();
    assert_eq!(rows.records.len(), 1);
    assert_eq!(rows.records[0].get("Designation"), Some("Lecturer"));
}

#[test]
fn missing_input_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_source_rows(&dir.path().join("absent.xlsx"), None).unwrap_err();
    assert_eq!(err.code(), "io");
}
