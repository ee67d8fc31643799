//! CSV ingestion.
//!
//! The opt-out export is hand-maintained, so the line decoder is deliberately
//! lenient: quotes may open anywhere in a field, `""` inside quotes is a
//! literal quote, and every field is trimmed (quoted content included).

pub mod booklist;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::CoreResult;
use crate::record::model::{CsvRow, CSV_WIDTH};

/// Rows decoded from an opt-out export.
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub rows: Vec<CsvRow>,
    /// Data lines skipped because their field count was wrong.
    pub malformed: usize,
}

/// Split one CSV line into trimmed fields.
///
/// An empty line yields a single empty field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Decode an opt-out export.
///
/// Blank lines are dropped and the first remaining line is treated as the
/// header (its names are not checked). Lines with the wrong number of fields
/// are logged and skipped.
pub fn parse_file(path: &Path) -> CoreResult<ParsedCsv> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_str(&content))
}

/// Decode an opt-out export already held in memory.
pub fn parse_str(content: &str) -> ParsedCsv {
    let mut parsed = ParsedCsv::default();

    let data_lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1);

    for (index, line) in data_lines.enumerate() {
        let fields = parse_line(line);
        let count = fields.len();

        match CsvRow::from_fields(fields) {
            Some(row) => parsed.rows.push(row),
            None => {
                warn!(
                    row = index + 1,
                    expected = CSV_WIDTH,
                    got = count,
                    "Skipping malformed row"
                );
                parsed.malformed += 1;
            }
        }
    }

    debug!(rows = parsed.rows.len(), malformed = parsed.malformed, "Decoded CSV");
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::model::CSV_HEADERS;
    use std::io::Write;

    fn data_line(term: &str, code: &str) -> String {
        format!(
            "01/05/2026,{term},1001,{code},S1,Ada,Lovelace,ada@example.edu,9780190916510,\"Social Work, Practice\",Smith,OUP,01/10/2026,01/20/2026,05/01/2026,Practice,SW685,Enrolled,Opted out,eBook"
        )
    }

    #[test]
    fn test_quoted_separator() {
        assert_eq!(parse_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(parse_line("a,\"b\"\"c\",d"), vec!["a", "b\"c", "d"]);
    }

    #[test]
    fn test_quote_opening_mid_field() {
        assert_eq!(parse_line("a\"b,c\"d,e"), vec!["ab,cd", "e"]);
    }

    #[test]
    fn test_empty_line_is_one_field() {
        assert_eq!(parse_line(""), vec![""]);
    }

    #[test]
    fn test_fields_are_trimmed_and_empty_kept() {
        assert_eq!(parse_line(" a ,, \" b \" ,"), vec!["a", "", "b", ""]);
    }

    #[test]
    fn test_parse_str_skips_header_blank_and_malformed() {
        let content = format!(
            "{}\n\n{}\nonly,three,fields\n   \n{}\r\n",
            CSV_HEADERS.join(","),
            data_line("Spring 2026", "SW-685-MOL2"),
            data_line("Fall 2026", "SW-685"),
        );

        let parsed = parse_str(&content);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.malformed, 1);
        assert_eq!(parsed.rows[0].term, "Spring 2026");
        assert_eq!(parsed.rows[0].title, "Social Work, Practice");
        assert_eq!(parsed.rows[1].course_and_section_code, "SW-685");
        assert_eq!(parsed.rows[1].content_type, "eBook");
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let parsed = parse_str("dateSent,term\n");
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.malformed, 0);
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", CSV_HEADERS.join(",")).unwrap();
        writeln!(file, "{}", data_line("Spring 2026", "SW-685-MOL2")).unwrap();

        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].student_id, "S1");
    }

    #[test]
    fn test_parse_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, crate::CoreError::Io(_)));
    }
}
