//! Matera-specific column rules.
//!
//! The Matera amount is the authoritative settlement value: parsing is
//! strict and any non-numeric text aborts the request instead of silently
//! becoming null. Amounts are written with comma as decimal separator.

use crate::error::{TransformError, TransformResult};
use crate::table::{Cell, Table};

use super::rules::{apply_sign, parse_comma_decimal, sequence_ids, MATERA_DEBIT_CODE, SEQUENCE_COLUMN};

/// Settlement amount column, comma-decimal text on input.
pub const MATERA_AMOUNT_COLUMN: &str = "nVlrLanc";

/// Historical-code column used by the sign-flip rule.
pub const MATERA_HISTORY_COLUMN: &str = "nHistorico";

/// Document column as exported.
pub const MATERA_DOCUMENT_COLUMN: &str = "sCpf_Cnpj";

/// Canonical name for the document column, shared with Depara.
pub const MATERA_DOCUMENT_RENAMED: &str = "CPF";

/// Apply the Matera rules in place: sequence column, strict amount parsing
/// with sign flip, document punctuation strip, canonical rename.
pub fn transform_matera(table: &mut Table) -> TransformResult<()> {
    table.set_column(SEQUENCE_COLUMN, sequence_ids("matera", table.height()));

    let codes = require(table, MATERA_HISTORY_COLUMN)?.to_vec();
    let amounts = require(table, MATERA_AMOUNT_COLUMN)?;

    let mut parsed = Vec::with_capacity(amounts.len());
    for (index, cell) in amounts.iter().enumerate() {
        let value = match cell {
            None => None,
            Some(Cell::Number(n)) => Some(*n),
            Some(Cell::Text(s)) => {
                Some(
                    parse_comma_decimal(s).ok_or_else(|| TransformError::InvalidAmount {
                        column: MATERA_AMOUNT_COLUMN.to_string(),
                        row: index + 1,
                        value: s.clone(),
                    })?,
                )
            }
        };
        parsed.push(value);
    }

    let signed = parsed
        .into_iter()
        .zip(codes.iter())
        .map(|(amount, code)| {
            apply_sign(amount, code.as_ref(), &[MATERA_DEBIT_CODE]).map(Cell::Number)
        })
        .collect();
    table.set_column(MATERA_AMOUNT_COLUMN, signed);

    let document = table
        .column_mut(MATERA_DOCUMENT_COLUMN)
        .ok_or_else(|| TransformError::MissingColumn(MATERA_DOCUMENT_COLUMN.to_string()))?;
    for cell in document.iter_mut() {
        if let Some(Cell::Text(text)) = cell {
            *text = text.chars().filter(|c| *c != '.' && *c != '-').collect();
        }
    }
    table.rename_column(MATERA_DOCUMENT_COLUMN, MATERA_DOCUMENT_RENAMED);

    Ok(())
}

fn require<'t>(table: &'t Table, name: &str) -> TransformResult<&'t [Option<Cell>]> {
    table
        .column(name)
        .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matera_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new();
        table.set_column(
            MATERA_AMOUNT_COLUMN,
            rows.iter().map(|r| Some(Cell::text(r.0))).collect(),
        );
        table.set_column(
            MATERA_HISTORY_COLUMN,
            rows.iter().map(|r| Some(Cell::text(r.1))).collect(),
        );
        table.set_column(
            MATERA_DOCUMENT_COLUMN,
            rows.iter().map(|r| Some(Cell::text(r.2))).collect(),
        );
        table
    }

    #[test]
    fn test_matera_scenario() {
        let mut table = matera_table(&[("10,50", "9001", "123.456.789-00")]);
        transform_matera(&mut table).unwrap();

        assert_eq!(
            table.column(MATERA_AMOUNT_COLUMN).unwrap()[0],
            Some(Cell::Number(-10.5))
        );
        assert_eq!(
            table.column(MATERA_DOCUMENT_RENAMED).unwrap()[0],
            Some(Cell::text("12345678900"))
        );
        assert!(table.column(MATERA_DOCUMENT_COLUMN).is_none());
        assert_eq!(
            table.column(SEQUENCE_COLUMN).unwrap()[0],
            Some(Cell::text("matera_01"))
        );
    }

    #[test]
    fn test_unflagged_code_is_positive() {
        let mut table = matera_table(&[("-2,25", "100", "1")]);
        transform_matera(&mut table).unwrap();
        assert_eq!(
            table.column(MATERA_AMOUNT_COLUMN).unwrap()[0],
            Some(Cell::Number(2.25))
        );
    }

    #[test]
    fn test_invalid_amount_is_an_error() {
        let mut table = matera_table(&[("10,50", "100", "1"), ("abc", "100", "2")]);
        let err = transform_matera(&mut table).unwrap_err();
        match err {
            TransformError::InvalidAmount { column, row, value } => {
                assert_eq!(column, MATERA_AMOUNT_COLUMN);
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_amount_cell_stays_missing() {
        let mut table = Table::new();
        table.set_column(MATERA_AMOUNT_COLUMN, vec![None]);
        table.set_column(MATERA_HISTORY_COLUMN, vec![Some(Cell::text("9001"))]);
        table.set_column(MATERA_DOCUMENT_COLUMN, vec![Some(Cell::text("1"))]);
        transform_matera(&mut table).unwrap();
        assert_eq!(table.column(MATERA_AMOUNT_COLUMN).unwrap()[0], None);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut table = Table::new();
        table.set_column(MATERA_AMOUNT_COLUMN, vec![Some(Cell::text("1,00"))]);
        let err = transform_matera(&mut table).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn(c) if c == MATERA_HISTORY_COLUMN));
    }
}
