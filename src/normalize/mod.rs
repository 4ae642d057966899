//! Header detection and cleanup for loosely formatted exports.
//!
//! Some exports carry an arbitrary number of banner rows before the real
//! header. The real header is anchored by reliably having a value in a known
//! structural column position, so locating it is a pluggable policy
//! ([`HeaderLocator`]) rather than a hard-coded offset: a future export
//! format only needs a new locator, not new normalization logic.
//!
//! Normalization promotes the located row to column names, drops unnamed and
//! duplicate columns, trims names, and drops residual header-artifact rows
//! (rows still carrying the placeholder marker in some cell).

use std::collections::HashSet;

use crate::error::{NormalizeError, NormalizeResult};
use crate::table::{Cell, RawTable, Table};

/// Prefix pandas-style exports use to name blank header cells. A cell whose
/// text starts with this marker is a header artifact, not data.
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Policy that locates the real header row inside a raw table.
pub trait HeaderLocator {
    /// Index of the header row, or an error if none qualifies.
    fn locate(&self, raw: &RawTable) -> NormalizeResult<usize>;
}

/// Header row is the first row with a value in a fixed anchor column.
/// Banner rows above it never populate that position.
#[derive(Debug, Clone, Copy)]
pub struct AnchorColumn {
    pub index: usize,
}

impl HeaderLocator for AnchorColumn {
    fn locate(&self, raw: &RawTable) -> NormalizeResult<usize> {
        raw.rows()
            .iter()
            .position(|row| row.get(self.index).is_some_and(|cell| cell.is_some()))
            .ok_or(NormalizeError::HeaderNotFound { anchor: self.index })
    }
}

/// Well-formed exports: the first row already is the header.
#[derive(Debug, Clone, Copy)]
pub struct FirstRow;

impl HeaderLocator for FirstRow {
    fn locate(&self, raw: &RawTable) -> NormalizeResult<usize> {
        if raw.is_empty() {
            Err(NormalizeError::EmptyTable)
        } else {
            Ok(0)
        }
    }
}

/// Normalize a raw table into named columns.
///
/// 1. Locate the header row via `locator`; everything above is discarded.
/// 2. Promote that row to column names; rows below are the body.
/// 3. Keep only columns with a usable name: non-null, non-empty after
///    trimming, not a placeholder, not a duplicate (first occurrence wins).
/// 4. Drop body rows where any kept cell still starts with the placeholder
///    marker (stray secondary banner lines).
pub fn normalize(raw: &RawTable, locator: &dyn HeaderLocator) -> NormalizeResult<Table> {
    let header_index = locator.locate(raw)?;
    let header = &raw.rows()[header_index];
    let body = &raw.rows()[header_index + 1..];

    // Column positions worth keeping, with their cleaned names
    let mut seen = HashSet::new();
    let mut kept: Vec<(usize, String)> = Vec::new();
    for (position, name) in header.iter().enumerate() {
        let Some(name) = name else { continue };
        let name = name.trim();
        if name.is_empty() || name.starts_with(PLACEHOLDER_PREFIX) {
            continue;
        }
        if !seen.insert(name.to_string()) {
            continue;
        }
        kept.push((position, name.to_string()));
    }

    let rows: Vec<&Vec<Option<String>>> = body
        .iter()
        .filter(|row| !is_placeholder_row(row, &kept))
        .collect();

    let mut table = Table::new();
    for (position, name) in &kept {
        let cells = rows
            .iter()
            .map(|row| row.get(*position).cloned().flatten().map(Cell::Text))
            .collect();
        table.set_column(name, cells);
    }
    Ok(table)
}

/// True if the row still looks like a stray header artifact: any cell in a
/// kept column starts with the placeholder marker.
fn is_placeholder_row(row: &[Option<String>], kept: &[(usize, String)]) -> bool {
    kept.iter().any(|(position, _)| {
        row.get(*position)
            .and_then(|cell| cell.as_deref())
            .is_some_and(|text| text.starts_with(PLACEHOLDER_PREFIX))
    })
}
