//! Multi-sheet workbook serialization.
//!
//! Pure function of the given tables: one sheet per table, header row first,
//! column widths sized to the longest cell text. No fonts, colors or filters.

use rust_xlsxwriter::Workbook;

use crate::table::{Cell, Table};
use crate::error::WriteResult;

/// Width floor in character units.
pub const MIN_COLUMN_WIDTH: f64 = 15.0;

/// Padding added on top of the longest cell text.
pub const COLUMN_PADDING: f64 = 2.0;

/// Serialize named tables into a single xlsx workbook, in the given order.
pub fn write_workbook(sheets: &[(&str, &Table)]) -> WriteResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for (name, table) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;

        for (position, column) in table.columns().enumerate() {
            let col = position as u16;
            sheet.write_string(0, col, column.name())?;
            let mut longest = column.name().chars().count();

            for (row, cell) in column.cells().iter().enumerate() {
                let row = row as u32 + 1;
                match cell {
                    Some(Cell::Text(text)) => {
                        sheet.write_string(row, col, text)?;
                        longest = longest.max(text.chars().count());
                    }
                    Some(Cell::Number(value)) => {
                        sheet.write_number(row, col, *value)?;
                        longest = longest.max(value.to_string().chars().count());
                    }
                    None => {}
                }
            }

            sheet.set_column_width(col, (longest as f64 + COLUMN_PADDING).max(MIN_COLUMN_WIDTH))?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
