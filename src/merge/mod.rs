//! Left join of a primary table against a projection of a secondary table.
//!
//! Key equality is exact text match; normalization already happened
//! upstream, so no coercion is applied here. Unmatched primary rows keep all
//! their columns and receive nulls for every appended column. Duplicate
//! secondary keys fan out in the standard left-join way (primary rows
//! multiply per match); keys are expected to be unique upstream.

use std::collections::HashMap;

use crate::error::{MergeError, MergeResult};
use crate::table::{Cell, Table};

/// Append `take` columns from `secondary` onto `primary`, matching rows by
/// equality on `key` (present in both tables).
///
/// With unique secondary keys the output has exactly the primary's row count
/// and row order.
pub fn left_join(
    primary: &Table,
    secondary: &Table,
    key: &str,
    take: &[&str],
) -> MergeResult<Table> {
    let primary_key = require(primary, "primary", key)?;
    let secondary_key = require(secondary, "secondary", key)?;
    for name in take {
        require(secondary, "secondary", name)?;
    }

    // Key text -> secondary row indices, preserving secondary order
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, cell) in secondary_key.iter().enumerate() {
        if let Some(cell) = cell {
            index.entry(cell.display()).or_default().push(row);
        }
    }

    // Each primary row expands to one output row per match, or one unmatched row
    let mut matches: Vec<(usize, Option<usize>)> = Vec::new();
    for (row, cell) in primary_key.iter().enumerate() {
        let hits = cell.as_ref().and_then(|c| index.get(&c.display()));
        match hits {
            Some(rows) => matches.extend(rows.iter().map(|&s| (row, Some(s)))),
            None => matches.push((row, None)),
        }
    }

    let mut joined = Table::new();
    for column in primary.columns() {
        let cells = matches
            .iter()
            .map(|&(row, _)| column.cells()[row].clone())
            .collect();
        joined.set_column(column.name(), cells);
    }
    for name in take {
        let source = require(secondary, "secondary", name)?;
        let cells: Vec<Option<Cell>> = matches
            .iter()
            .map(|&(_, matched)| matched.and_then(|row| source[row].clone()))
            .collect();
        joined.set_column(name, cells);
    }
    Ok(joined)
}

fn require<'t>(table: &'t Table, side: &'static str, name: &str) -> MergeResult<&'t [Option<Cell>]> {
    table.column(name).ok_or_else(|| MergeError::MissingColumn {
        side,
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[(&str, &[Option<&str>])]) -> Table {
        let mut t = Table::new();
        for (name, cells) in columns {
            t.set_column(name, cells.iter().map(|c| c.map(Cell::text)).collect());
        }
        t
    }

    fn texts(t: &Table, name: &str) -> Vec<Option<String>> {
        t.column(name)
            .unwrap()
            .iter()
            .map(|c| c.as_ref().map(|v| v.display()))
            .collect()
    }

    #[test]
    fn test_matched_rows_enriched() {
        let primary = table(&[("Id Conta", &[Some("1"), Some("2")])]);
        let secondary = table(&[
            ("Id Conta", &[Some("2"), Some("1")]),
            ("Nome", &[Some("Bruna"), Some("Alice")]),
        ]);

        let joined = left_join(&primary, &secondary, "Id Conta", &["Nome"]).unwrap();
        assert_eq!(joined.column_names(), vec!["Id Conta", "Nome"]);
        assert_eq!(
            texts(&joined, "Nome"),
            vec![Some("Alice".into()), Some("Bruna".into())]
        );
    }

    #[test]
    fn test_unmatched_rows_get_nulls_and_count_is_invariant() {
        let primary = table(&[
            ("Id Conta", &[Some("1"), Some("9"), None]),
            ("Valor", &[Some("5"), Some("7"), Some("3")]),
        ]);
        let secondary = table(&[
            ("Id Conta", &[Some("1")]),
            ("Nome", &[Some("Alice")]),
        ]);

        let joined = left_join(&primary, &secondary, "Id Conta", &["Nome"]).unwrap();
        assert_eq!(joined.height(), primary.height());
        assert_eq!(
            texts(&joined, "Nome"),
            vec![Some("Alice".into()), None, None]
        );
        // Primary columns survive untouched
        assert_eq!(
            texts(&joined, "Valor"),
            vec![Some("5".into()), Some("7".into()), Some("3".into())]
        );
    }

    #[test]
    fn test_duplicate_secondary_keys_fan_out() {
        let primary = table(&[("Id Conta", &[Some("1"), Some("2")])]);
        let secondary = table(&[
            ("Id Conta", &[Some("1"), Some("1")]),
            ("Nome", &[Some("A"), Some("B")]),
        ]);

        let joined = left_join(&primary, &secondary, "Id Conta", &["Nome"]).unwrap();
        assert_eq!(joined.height(), 3);
        assert_eq!(
            texts(&joined, "Nome"),
            vec![Some("A".into()), Some("B".into()), None]
        );
    }

    #[test]
    fn test_missing_key_column() {
        let primary = table(&[("Valor", &[Some("5")])]);
        let secondary = table(&[("Id Conta", &[Some("1")])]);

        let err = left_join(&primary, &secondary, "Id Conta", &[]).unwrap_err();
        match err {
            MergeError::MissingColumn { side, column } => {
                assert_eq!(side, "primary");
                assert_eq!(column, "Id Conta");
            }
        }
    }

    #[test]
    fn test_missing_enrichment_column() {
        let primary = table(&[("Id Conta", &[Some("1")])]);
        let secondary = table(&[("Id Conta", &[Some("1")])]);

        let err = left_join(&primary, &secondary, "Id Conta", &["Nome"]).unwrap_err();
        assert!(matches!(
            err,
            MergeError::MissingColumn { side: "secondary", .. }
        ));
    }
}
