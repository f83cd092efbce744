//! Format dispatch and delimited-text parsing
//!
//! Exactly two formats are supported: `csv` and `xlsx` (case-insensitive).
//! Anything else fails fast with [`ParseError::UnsupportedFormat`] before
//! any decoding is attempted.

use thiserror::Error;

use super::types::RawRow;
use super::xlsx;

/// Failures while decoding an uploaded file into raw rows.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed spreadsheet: {0}")]
    Xlsx(String),
}

/// Decode `buffer` according to its declared file extension.
///
/// An empty buffer yields an empty row sequence, not an error.
pub fn parse(buffer: &[u8], extension: &str) -> Result<Vec<RawRow>, ParseError> {
    match extension.to_ascii_lowercase().as_str() {
        "csv" => parse_csv(buffer),
        "xlsx" => xlsx::parse_xlsx(buffer),
        other => Err(ParseError::UnsupportedFormat(other.to_string())),
    }
}

/// Stream-parse delimited text. The first record is the header; each later
/// record is decoded incrementally off the underlying reader and pushed as
/// one [`RawRow`] — the csv reader never materializes the file as rows
/// itself.
fn parse_csv(buffer: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(buffer);

    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_header_defines_keys() {
        let buffer = b"firstname,agent,policy_number\nAlice,Bob,P100\nCarol,Dan,P200\n";
        let rows = parse(buffer, "csv").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("firstname").map(String::as_str), Some("Alice"));
        assert_eq!(rows[0].get("agent").map(String::as_str), Some("Bob"));
        assert_eq!(rows[1].get("policy_number").map(String::as_str), Some("P200"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let buffer = b"firstname\nAlice\n";
        assert_eq!(parse(buffer, "CSV").unwrap().len(), 1);
        assert_eq!(parse(buffer, "Csv").unwrap().len(), 1);
    }

    #[test]
    fn test_unsupported_extension_fails_fast() {
        let err = parse(b"anything", "txt").unwrap_err();
        match err {
            ParseError::UnsupportedFormat(ext) => assert_eq!(ext, "txt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_extension_is_unsupported() {
        assert!(matches!(
            parse(b"", ""),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_buffer_yields_no_rows() {
        assert!(parse(b"", "csv").unwrap().is_empty());
    }

    #[test]
    fn test_blank_csv_lines_are_skipped() {
        let buffer = b"firstname,agent\nAlice,Bob\n,\nCarol,Dan\n";
        let rows = parse(buffer, "csv").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        // Short row: missing columns simply have no entry.
        let buffer = b"firstname,agent,policy_number\nAlice,Bob\n";
        let rows = parse(buffer, "csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("firstname").map(String::as_str), Some("Alice"));
        assert_eq!(rows[0].get("policy_number"), None);
    }
}
