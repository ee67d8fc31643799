//! Booklist export reader.
//!
//! Booklists are clean, header-keyed exports, so they go through the `csv`
//! crate and are deserialized by column name. Columns other than the ones
//! below are ignored; missing ones read as empty.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::CoreResult;

/// One line of a booklist export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BooklistRow {
    #[serde(rename = "CRN")]
    pub crn: String,
    #[serde(rename = "DepartmentCode*")]
    pub department_code: String,
    #[serde(rename = "CourseCode*")]
    pub course_code: String,
    #[serde(rename = "SectionCode*")]
    pub section_code: String,
    #[serde(rename = "Publisher*")]
    pub publisher: String,
    #[serde(rename = "Requested ISBN*")]
    pub isbn: String,
    #[serde(rename = "Title*")]
    pub title: String,
}

/// Read every row of a booklist export.
pub fn read_booklist(path: &Path) -> CoreResult<Vec<BooklistRow>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    collect_rows(reader)
}

/// Read booklist rows from any reader.
pub fn read_booklist_from<R: std::io::Read>(input: R) -> CoreResult<Vec<BooklistRow>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: std::io::Read>(mut reader: csv::Reader<R>) -> CoreResult<Vec<BooklistRow>> {
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: BooklistRow = record?;
        rows.push(row);
    }

    debug!(rows = rows.len(), "Read booklist");
    Ok(rows)
}
