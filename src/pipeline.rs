//! End-to-end reconciliation pipeline.
//!
//! Synchronous, request-local orchestration of the five steps:
//!
//! ```text
//! bytes ──▶ load ──▶ normalize ──▶ transform ──┐
//! bytes ──▶ load ──▶ normalize ──▶ transform ──┼──▶ merge ──▶ write ──▶ xlsx
//! bytes ──▶ load ──▶ normalize ────────────────┘
//! ```
//!
//! Each input's failures are attributed to that input; any failure aborts
//! the whole run and no partial workbook is ever produced.

use serde::Serialize;

use crate::api::logs::{log_info, log_input, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult, StageError};
use crate::loader::{load_delimited, load_spreadsheet};
use crate::merge::left_join;
use crate::normalize::{normalize, AnchorColumn, FirstRow};
use crate::table::Table;
use crate::transform::{transform_dock, transform_matera};
use crate::transform::dock::DOCK_KEY_COLUMN;
use crate::writer::write_workbook;

/// Anchor position that marks the real header row in Dock and Depara exports.
pub const HEADER_ANCHOR_COLUMN: usize = 2;

/// Field delimiter used by Matera exports.
pub const MATERA_DELIMITER: u8 = b';';

/// Depara columns copied onto matching Dock rows.
pub const ENRICHMENT_COLUMNS: [&str; 4] = ["CPF", "Nome", "Status Conta", "Data Cadastramento"];

/// Download name for the generated workbook.
pub const OUTPUT_FILE_NAME: &str = "dock_matera_depara.xlsx";

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Serialized workbook, ready to send as an attachment.
    pub workbook: Vec<u8>,
    /// Row counts per sheet.
    pub summary: PipelineSummary,
}

/// Row counts of the three output sheets.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub dock_rows: usize,
    pub matera_rows: usize,
    pub depara_rows: usize,
}

/// Run the whole pipeline on the three uploaded byte streams.
///
/// Returns the serialized workbook with sheets `Dock`, `Matera` and
/// `Depara`, or the first stage failure attributed to its input.
pub fn run(dock: &[u8], matera: &[u8], depara: &[u8]) -> PipelineResult<PipelineOutput> {
    log_input("Dock", "Reading ledger export...");
    let dock_table = prepare_dock(dock).map_err(PipelineError::Dock)?;
    log_success(format!(
        "Dock: {} rows, {} columns",
        dock_table.height(),
        dock_table.width()
    ));

    log_input("Matera", "Reading settlement export...");
    let matera_table = prepare_matera(matera).map_err(PipelineError::Matera)?;
    log_success(format!(
        "Matera: {} rows, {} columns",
        matera_table.height(),
        matera_table.width()
    ));

    log_input("Depara", "Reading account mapping...");
    let depara_table = prepare_depara(depara).map_err(PipelineError::Depara)?;
    log_success(format!(
        "Depara: {} rows, {} columns",
        depara_table.height(),
        depara_table.width()
    ));

    log_info("Enriching Dock rows from Depara...");
    let enriched = left_join(
        &dock_table,
        &depara_table,
        DOCK_KEY_COLUMN,
        &ENRICHMENT_COLUMNS,
    )?;

    let unmatched = ENRICHMENT_COLUMNS
        .first()
        .and_then(|name| enriched.column(name))
        .map_or(0, |cells| cells.iter().filter(|c| c.is_none()).count());
    if unmatched > 0 {
        log_warning(format!("{} Dock rows had no Depara match", unmatched));
    }

    log_info("Writing workbook...");
    let summary = PipelineSummary {
        dock_rows: enriched.height(),
        matera_rows: matera_table.height(),
        depara_rows: depara_table.height(),
    };
    let workbook = write_workbook(&[
        ("Dock", &enriched),
        ("Matera", &matera_table),
        ("Depara", &depara_table),
    ])?;
    log_success(format!("Workbook ready ({} bytes)", workbook.len()));

    Ok(PipelineOutput { workbook, summary })
}

/// Dock: spreadsheet with banner rows, tolerant amount rules.
fn prepare_dock(bytes: &[u8]) -> Result<Table, StageError> {
    let raw = load_spreadsheet(bytes)?;
    let mut table = normalize(&raw, &AnchorColumn { index: HEADER_ANCHOR_COLUMN })?;
    transform_dock(&mut table);
    Ok(table)
}

/// Matera: well-formed semicolon-delimited text, strict amount rules.
fn prepare_matera(bytes: &[u8]) -> Result<Table, StageError> {
    let raw = load_delimited(bytes, MATERA_DELIMITER)?;
    let mut table = normalize(&raw, &FirstRow)?;
    transform_matera(&mut table)?;
    Ok(table)
}

/// Depara: spreadsheet with banner rows, no column rules.
fn prepare_depara(bytes: &[u8]) -> Result<Table, StageError> {
    let raw = load_spreadsheet(bytes)?;
    Ok(normalize(&raw, &AnchorColumn { index: HEADER_ANCHOR_COLUMN })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use rust_xlsxwriter::Workbook;
    use std::io::Cursor;

    fn xlsx_bytes(rows: &[&[Option<&str>]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(value) = cell {
                    sheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn dock_fixture() -> Vec<u8> {
        xlsx_bytes(&[
            &[Some("Relatorio"), None, None],
            &[Some("Periodo"), None, None],
            &[Some("Id Conta"), Some("Id Tipo Transacao"), Some("Valor")],
            &[Some("10"), Some("30224"), Some("5")],
            &[Some("11"), Some("100"), Some("7")],
            &[Some("12"), Some("30350"), Some("-3")],
        ])
    }

    fn depara_fixture() -> Vec<u8> {
        xlsx_bytes(&[
            &[Some("Mapa de contas"), None, None],
            &[
                Some("Id Conta"),
                Some("CPF"),
                Some("Nome"),
                Some("Status Conta"),
                Some("Data Cadastramento"),
            ],
            &[Some("10"), Some("111"), Some("Alice"), Some("Ativa"), Some("2024-01-01")],
            &[Some("12"), Some("333"), Some("Carla"), Some("Ativa"), Some("2024-02-01")],
        ])
    }

    const MATERA_FIXTURE: &[u8] =
        b"sCpf_Cnpj;nHistorico;nVlrLanc\n123.456.789-00;9001;10,50\n987.654.321-00;100;2,00\n";

    fn read_sheet(bytes: &[u8], name: &str) -> Vec<Vec<Data>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        workbook
            .worksheet_range(name)
            .unwrap()
            .rows()
            .map(|r| r.to_vec())
            .collect()
    }

    #[test]
    fn test_end_to_end() {
        let output = run(&dock_fixture(), MATERA_FIXTURE, &depara_fixture()).unwrap();
        assert_eq!(output.summary.dock_rows, 3);
        assert_eq!(output.summary.matera_rows, 2);
        assert_eq!(output.summary.depara_rows, 2);

        let dock = read_sheet(&output.workbook, "Dock");
        let header: Vec<String> = dock[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            header,
            vec![
                "Id Conta",
                "Id Tipo Transacao",
                "Valor",
                "lcto",
                "CPF",
                "Nome",
                "Status Conta",
                "Data Cadastramento"
            ]
        );

        // Sign-flipped amounts and sequence ids
        assert_eq!(dock[1][2], Data::Float(-5.0));
        assert_eq!(dock[2][2], Data::Float(7.0));
        assert_eq!(dock[3][2], Data::Float(-3.0));
        assert_eq!(dock[1][3], Data::String("dock_01".into()));

        // Enrichment: rows 10 and 12 matched, 11 did not
        assert_eq!(dock[1][5], Data::String("Alice".into()));
        assert_eq!(dock[2][5], Data::Empty);
        assert_eq!(dock[3][5], Data::String("Carla".into()));

        let matera = read_sheet(&output.workbook, "Matera");
        assert_eq!(matera[1][2], Data::Float(-10.5));
        assert_eq!(matera[2][2], Data::Float(2.0));
        assert_eq!(matera[1][0], Data::String("12345678900".into()));
        let matera_header: Vec<String> = matera[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(matera_header, vec!["CPF", "nHistorico", "nVlrLanc", "lcto"]);
    }

    #[test]
    fn test_output_opens_from_disk() {
        let output = run(&dock_fixture(), MATERA_FIXTURE, &depara_fixture()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE_NAME);
        std::fs::write(&path, &output.workbook).unwrap();

        let mut workbook: Xlsx<_> = calamine::open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec!["Dock", "Matera", "Depara"]
        );
    }

    #[test]
    fn test_depara_without_anchor_is_attributed() {
        let broken = xlsx_bytes(&[&[Some("a"), Some("b")], &[Some("1"), Some("2")]]);
        let err = run(&dock_fixture(), MATERA_FIXTURE, &broken).unwrap_err();
        assert_eq!(err.input(), Some("Depara"));
        assert!(matches!(
            err,
            PipelineError::Depara(StageError::Normalize(NormalizeError::HeaderNotFound {
                anchor: HEADER_ANCHOR_COLUMN
            }))
        ));
    }

    #[test]
    fn test_empty_matera_is_attributed() {
        let err = run(&dock_fixture(), b"", &depara_fixture()).unwrap_err();
        assert_eq!(err.input(), Some("Matera"));
    }

    #[test]
    fn test_bad_matera_amount_aborts() {
        let matera = b"sCpf_Cnpj;nHistorico;nVlrLanc\n1;100;abc\n";
        let err = run(&dock_fixture(), matera, &depara_fixture()).unwrap_err();
        assert_eq!(err.input(), Some("Matera"));
        assert!(err.to_string().contains("abc"));
    }
}
