//! Dock-specific column rules.
//!
//! The Dock amount is optional context, so coercion is tolerant: text that
//! fails to parse becomes a missing value instead of failing the request.

use crate::table::{Cell, Table};

use super::rules::{apply_sign, coerce_lenient, sequence_ids, DOCK_DEBIT_CODES, SEQUENCE_COLUMN};

/// Transaction-type column used by the sign-flip rule.
pub const DOCK_TYPE_COLUMN: &str = "Id Tipo Transacao";

/// Amount column.
pub const DOCK_AMOUNT_COLUMN: &str = "Valor";

/// Account column the Depara enrichment joins on.
pub const DOCK_KEY_COLUMN: &str = "Id Conta";

/// Apply the Dock rules in place: inject the sequence column, then coerce
/// and sign-flip the amount.
///
/// The sign flip only runs when both the type-code and amount columns are
/// present; a Dock export without them is passed through untouched.
pub fn transform_dock(table: &mut Table) {
    table.set_column(SEQUENCE_COLUMN, sequence_ids("dock", table.height()));

    let Some(codes) = table.column(DOCK_TYPE_COLUMN).map(<[_]>::to_vec) else {
        return;
    };
    let Some(amounts) = table.column(DOCK_AMOUNT_COLUMN) else {
        return;
    };

    let flipped = amounts
        .iter()
        .zip(codes.iter())
        .map(|(amount, code)| {
            apply_sign(coerce_lenient(amount.as_ref()), code.as_ref(), &DOCK_DEBIT_CODES)
                .map(Cell::Number)
        })
        .collect();
    table.set_column(DOCK_AMOUNT_COLUMN, flipped);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dock_table(codes: &[&str], amounts: &[&str]) -> Table {
        let mut table = Table::new();
        table.set_column(
            DOCK_TYPE_COLUMN,
            codes.iter().map(|c| Some(Cell::text(*c))).collect(),
        );
        table.set_column(
            DOCK_AMOUNT_COLUMN,
            amounts.iter().map(|a| Some(Cell::text(*a))).collect(),
        );
        table
    }

    #[test]
    fn test_dock_scenario() {
        let mut table = dock_table(&["30224", "100", "30350"], &["5", "7", "-3"]);
        transform_dock(&mut table);

        let amounts: Vec<_> = table
            .column(DOCK_AMOUNT_COLUMN)
            .unwrap()
            .iter()
            .map(|c| c.as_ref().and_then(Cell::as_number))
            .collect();
        assert_eq!(amounts, vec![Some(-5.0), Some(7.0), Some(-3.0)]);

        let ids: Vec<_> = table
            .column(SEQUENCE_COLUMN)
            .unwrap()
            .iter()
            .map(|c| c.as_ref().unwrap().display())
            .collect();
        assert_eq!(ids, vec!["dock_01", "dock_02", "dock_03"]);
    }

    #[test]
    fn test_unparseable_amount_becomes_null() {
        let mut table = dock_table(&["30224", "100"], &["n/a", "2"]);
        transform_dock(&mut table);
        let amounts = table.column(DOCK_AMOUNT_COLUMN).unwrap();
        assert_eq!(amounts[0], None);
        assert_eq!(amounts[1], Some(Cell::Number(2.0)));
    }

    #[test]
    fn test_sign_flip_skipped_without_type_column() {
        let mut table = Table::new();
        table.set_column(
            DOCK_AMOUNT_COLUMN,
            vec![Some(Cell::text("-3")), Some(Cell::text("4"))],
        );
        transform_dock(&mut table);

        // Amounts untouched, sequence still injected
        assert_eq!(
            table.column(DOCK_AMOUNT_COLUMN).unwrap()[0],
            Some(Cell::text("-3"))
        );
        assert_eq!(table.column(SEQUENCE_COLUMN).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_table_gets_empty_sequence() {
        let mut table = Table::new();
        transform_dock(&mut table);
        assert_eq!(table.column(SEQUENCE_COLUMN).unwrap().len(), 0);
    }
}
