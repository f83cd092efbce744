//! Spreadsheet (OOXML) decoding
//!
//! An `.xlsx` file is a zip container of XML parts. Only the FIRST sheet in
//! declared workbook order is read; its first non-empty row defines the
//! header keys and each later non-empty row becomes one [`RawRow`].

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::parser::ParseError;
use super::types::RawRow;

/// Decode an xlsx buffer into raw rows. Fully materialized; spreadsheet
/// decoding is not naturally streaming.
pub(super) fn parse_xlsx(buffer: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    if buffer.is_empty() {
        return Ok(Vec::new());
    }

    let mut archive =
        ZipArchive::new(Cursor::new(buffer)).map_err(|e| ParseError::Xlsx(e.to_string()))?;

    let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet_path = first_sheet_path(&mut archive)?;
    let sheet_xml = read_part(&mut archive, &sheet_path)?
        .ok_or_else(|| ParseError::Xlsx(format!("missing worksheet part {sheet_path}")))?;

    parse_sheet(&sheet_xml, &shared_strings)
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, ParseError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ParseError::Xlsx(e.to_string())),
    };
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ParseError::Xlsx(e.to_string()))?;
    Ok(Some(xml))
}

// ============================================================================
// Workbook structure (static parts deserialized declaratively)
// ============================================================================

#[derive(Debug, Deserialize)]
struct Workbook {
    sheets: WorkbookSheets,
}

#[derive(Debug, Deserialize)]
struct WorkbookSheets {
    #[serde(rename = "sheet", default)]
    sheets: Vec<WorkbookSheet>,
}

#[derive(Debug, Deserialize)]
struct WorkbookSheet {
    #[serde(rename = "@r:id")]
    rel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Relationships {
    #[serde(rename = "Relationship", default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    #[serde(rename = "@Id")]
    id: String,
    #[serde(rename = "@Target")]
    target: String,
}

/// Resolve the first sheet (by declared order, not by name) through the
/// workbook and its relationships part. Falls back to the conventional
/// `xl/worksheets/sheet1.xml` when either part is absent.
fn first_sheet_path(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ParseError> {
    const DEFAULT_SHEET: &str = "xl/worksheets/sheet1.xml";

    let Some(workbook_xml) = read_part(archive, "xl/workbook.xml")? else {
        return Ok(DEFAULT_SHEET.to_string());
    };
    let workbook: Workbook = quick_xml::de::from_str(&workbook_xml)
        .map_err(|e| ParseError::Xlsx(format!("invalid workbook part: {e}")))?;

    let Some(rel_id) = workbook
        .sheets
        .sheets
        .first()
        .and_then(|sheet| sheet.rel_id.clone())
    else {
        return Ok(DEFAULT_SHEET.to_string());
    };

    let Some(rels_xml) = read_part(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(DEFAULT_SHEET.to_string());
    };
    let rels: Relationships = quick_xml::de::from_str(&rels_xml)
        .map_err(|e| ParseError::Xlsx(format!("invalid workbook relationships: {e}")))?;

    let Some(target) = rels
        .relationships
        .into_iter()
        .find(|rel| rel.id == rel_id)
        .map(|rel| rel.target)
    else {
        return Ok(DEFAULT_SHEET.to_string());
    };

    // Targets are relative to xl/ unless absolute within the container.
    Ok(match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    })
}

// ============================================================================
// Shared strings
// ============================================================================

#[derive(Debug, Deserialize)]
struct SharedStrings {
    #[serde(rename = "si", default)]
    items: Vec<SharedStringItem>,
}

#[derive(Debug, Deserialize)]
struct SharedStringItem {
    #[serde(rename = "t")]
    text: Option<PlainText>,
    #[serde(rename = "r", default)]
    runs: Vec<RichTextRun>,
}

#[derive(Debug, Deserialize)]
struct RichTextRun {
    #[serde(rename = "t")]
    text: Option<PlainText>,
}

#[derive(Debug, Default, Deserialize)]
struct PlainText {
    #[serde(rename = "$value", default)]
    value: String,
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, ParseError> {
    let sst: SharedStrings = quick_xml::de::from_str(xml)
        .map_err(|e| ParseError::Xlsx(format!("invalid shared strings part: {e}")))?;

    Ok(sst
        .items
        .into_iter()
        .map(|item| match item.text {
            Some(text) => text.value,
            // Rich text: concatenate the runs.
            None => item
                .runs
                .into_iter()
                .filter_map(|run| run.text)
                .map(|text| text.value)
                .collect(),
        })
        .collect())
}

// ============================================================================
// Worksheet grid
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum CellType {
    Shared,
    Inline,
    Other,
}

/// Walk the worksheet XML row by row. Cells are positioned by their `r`
/// reference (`B3`); cells without one continue from the previous column.
fn parse_sheet(xml: &str, shared_strings: &[String]) -> Result<Vec<RawRow>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut grid: Vec<Vec<(u32, String)>> = Vec::new();
    let mut current_row: Vec<(u32, String)> = Vec::new();

    let mut cell_col = 0u32;
    let mut next_col = 0u32;
    let mut cell_type = CellType::Other;
    let mut cell_value = String::new();
    let mut capture = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"c" =>
            {
                cell_col = next_col;
                cell_type = CellType::Other;
                cell_value.clear();
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| ParseError::Xlsx(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"r" => {
                            let reference = attr
                                .unescape_value()
                                .map_err(|e| ParseError::Xlsx(e.to_string()))?;
                            if let Some(col) = column_index(&reference) {
                                cell_col = col;
                            }
                        },
                        b"t" => {
                            cell_type = match attr.value.as_ref() {
                                b"s" => CellType::Shared,
                                b"inlineStr" => CellType::Inline,
                                _ => CellType::Other,
                            };
                        },
                        _ => {},
                    }
                }
                next_col = cell_col + 1;
            },
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    current_row.clear();
                    next_col = 0;
                },
                b"v" => capture = true,
                b"t" if cell_type == CellType::Inline => capture = true,
                _ => {},
            },
            Ok(Event::Text(t)) if capture => {
                let text = t.unescape().map_err(|e| ParseError::Xlsx(e.to_string()))?;
                cell_value.push_str(&text);
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => {
                    let value = match cell_type {
                        CellType::Shared => cell_value
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|idx| shared_strings.get(idx))
                            .cloned()
                            .unwrap_or_default(),
                        _ => std::mem::take(&mut cell_value),
                    };
                    if !value.is_empty() {
                        current_row.push((cell_col, value));
                    }
                },
                b"row" => {
                    if !current_row.is_empty() {
                        grid.push(std::mem::take(&mut current_row));
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xlsx(e.to_string())),
            _ => {},
        }
    }

    let mut rows_iter = grid.into_iter();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Vec::new());
    };
    let headers: HashMap<u32, String> = header_row.into_iter().collect();

    Ok(rows_iter
        .map(|cells| {
            cells
                .into_iter()
                .filter_map(|(col, value)| {
                    headers.get(&col).map(|header| (header.clone(), value))
                })
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_empty())
        .collect())
}

/// Column index from an `A1`-style cell reference (`A` -> 0, `AB` -> 27).
fn column_index(reference: &str) -> Option<u32> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0u32;
    for c in letters.chars() {
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Some(index - 1)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build a minimal single-sheet xlsx container for tests.
    pub(crate) fn build_xlsx(rows: &[&[&str]]) -> Vec<u8> {
        let mut sheet = String::from(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (row_idx, cells) in rows.iter().enumerate() {
            sheet.push_str(&format!(r#"<row r="{}">"#, row_idx + 1));
            for (col_idx, value) in cells.iter().enumerate() {
                let column = char::from(b'A' + col_idx as u8);
                sheet.push_str(&format!(
                    r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    column,
                    row_idx + 1,
                    value
                ));
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let workbook = r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        let rels = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in [
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_parse_xlsx_first_sheet() {
        let buffer = build_xlsx(&[
            &["firstname", "agent", "policy_number"],
            &["Alice", "Bob", "P100"],
            &["Carol", "Dan", "P200"],
        ]);

        let rows = parse_xlsx(&buffer).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("firstname").map(String::as_str), Some("Alice"));
        assert_eq!(rows[1].get("agent").map(String::as_str), Some("Dan"));
    }

    #[test]
    fn test_parse_xlsx_empty_buffer() {
        assert!(parse_xlsx(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_xlsx_garbage_is_an_error() {
        assert!(matches!(
            parse_xlsx(b"this is not a zip container"),
            Err(ParseError::Xlsx(_))
        ));
    }

    #[test]
    fn test_parse_xlsx_header_only() {
        let buffer = build_xlsx(&[&["firstname", "agent"]]);
        assert!(parse_xlsx(&buffer).unwrap().is_empty());
    }

    #[test]
    fn test_shared_strings_plain_and_rich() {
        let xml = r#"<?xml version="1.0"?>
        <sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
            <si><t>plain</t></si>
            <si><r><t>ri</t></r><r><t>ch</t></r></si>
        </sst>"#;

        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["plain".to_string(), "rich".to_string()]);
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("C7"), Some(2));
        assert_eq!(column_index("Z1"), Some(25));
        assert_eq!(column_index("AA1"), Some(26));
        assert_eq!(column_index("AB12"), Some(27));
        assert_eq!(column_index("12"), None);
    }
}
