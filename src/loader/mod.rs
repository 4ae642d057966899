//! Raw tabular loading with no type inference.
//!
//! Every cell is read as text: downstream steps need to see raw placeholder
//! markers and do their own controlled coercion, so the loader must never
//! guess at numbers or dates. Two source kinds are supported:
//!
//! - spreadsheets (xlsx/xlsm) via calamine, first worksheet only
//! - delimited text with encoding auto-detection and a caller-supplied
//!   delimiter

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use crate::error::{LoadError, LoadResult};
use crate::table::RawTable;

/// Load the first worksheet of a spreadsheet as raw text cells.
pub fn load_spreadsheet(bytes: &[u8]) -> LoadResult<RawTable> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(cursor)
            .map_err(|e: calamine::XlsxError| LoadError::Spreadsheet(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheet)?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| LoadError::Spreadsheet(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(RawTable::new(rows))
}

/// Load delimited text as raw text cells.
///
/// The byte encoding is auto-detected before parsing; fields are trimmed and
/// empty fields become nulls.
pub fn load_delimited(bytes: &[u8], delimiter: u8) -> LoadResult<RawTable> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }

    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(RawTable::new(rows))
}

/// Stringify a spreadsheet cell without numeric or date inference.
///
/// Whitespace-only strings count as null, so the anchor test downstream
/// means "has visible text".
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .or_else(|_| Ok(String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: try UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
    .map_err(|e: std::string::FromUtf8Error| LoadError::Encoding(e.to_string()))
}
