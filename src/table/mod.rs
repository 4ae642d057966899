//! In-memory tabular data model.
//!
//! Two shapes, matching the two halves of the pipeline:
//!
//! - [`RawTable`] - positional rows of nullable text cells, exactly as read
//!   from the input stream. No column identity yet.
//! - [`Table`] - ordered named columns of nullable cells. Produced by header
//!   normalization; everything downstream (transforms, merge, writer) works
//!   on this shape.
//!
//! Cells start out as text; transforms may coerce a column to numbers. Both
//! shapes are request-local and never shared across requests.

use std::fmt;

/// A single cell value: raw text, or a number after controlled coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Build a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }

    /// Textual form, as it would appear in the output workbook.
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

// =============================================================================
// RawTable
// =============================================================================

/// Ordered rows of nullable text cells, before any column identity exists.
///
/// Rows may be ragged; consumers index cells positionally and treat a missing
/// position as null.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Table
// =============================================================================

/// One named column and its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Option<Cell>>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }
}

/// Ordered named columns of equal length.
///
/// Column order is the order of first appearance. All columns hold the same
/// number of cells; [`Table::set_column`] keeps that invariant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cells of a column, if present.
    pub fn column(&self, name: &str) -> Option<&[Option<Cell>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }

    /// Mutable cells of a column, if present.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<Option<Cell>>> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.cells)
    }

    /// Replace a column's cells, or append a new column at the end.
    ///
    /// Same assignment semantics as `df[name] = values`: writing to an
    /// existing name overwrites in place and keeps its position.
    pub fn set_column(&mut self, name: &str, cells: Vec<Option<Cell>>) {
        debug_assert!(
            self.columns.is_empty() || cells.len() == self.height(),
            "column '{}' has {} cells, table height is {}",
            name,
            cells.len(),
            self.height()
        );
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.cells = cells,
            None => self.columns.push(Column {
                name: name.to_string(),
                cells,
            }),
        }
    }

    /// Rename a column in place. Returns false if it does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(column) => {
                column.name = to.to_string();
                true
            }
            None => false,
        }
    }
}
