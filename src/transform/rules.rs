//! Field-level rules shared by the table transforms.
//!
//! Small, fixed lookup sets and coercion helpers. Codes are compared as
//! trimmed text because every cell is loaded as text.

use crate::table::Cell;

/// Dock transaction-type codes that mark a debit entry.
pub const DOCK_DEBIT_CODES: [&str; 2] = ["30224", "30350"];

/// Matera historical code that marks a debit settlement.
pub const MATERA_DEBIT_CODE: &str = "9001";

/// Name of the synthetic per-table sequence column.
pub const SEQUENCE_COLUMN: &str = "lcto";

/// Build the synthetic sequence column: `<prefix>_01`, `<prefix>_02`, ...
///
/// Purely a table-local traceability label, unrelated to any domain key.
pub fn sequence_ids(prefix: &str, count: usize) -> Vec<Option<Cell>> {
    (1..=count)
        .map(|i| Some(Cell::Text(format!("{prefix}_{i:02}"))))
        .collect()
}

/// Tolerant numeric coercion: unparseable text becomes a missing value.
pub fn coerce_lenient(cell: Option<&Cell>) -> Option<f64> {
    match cell {
        None => None,
        Some(Cell::Number(n)) => Some(*n),
        Some(Cell::Text(s)) => s.trim().parse().ok(),
    }
}

/// Parse an amount written with comma as decimal separator.
pub fn parse_comma_decimal(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

/// Apply the sign convention: a flagged code forces a negative magnitude,
/// anything else a positive one. A missing amount stays missing.
pub fn apply_sign(amount: Option<f64>, code: Option<&Cell>, flagged: &[&str]) -> Option<f64> {
    let debit = code.is_some_and(|c| {
        let code = c.display();
        let code = code.trim();
        flagged.iter().any(|f| *f == code)
    });
    amount.map(|v| if debit { -v.abs() } else { v.abs() })
}
