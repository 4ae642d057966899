//! # Conciliator - Dock / Matera / Depara reconciliation
//!
//! Conciliator takes three exported files (a Dock ledger spreadsheet, a
//! Matera settlement CSV and a Depara account mapping spreadsheet), cleans
//! each into a proper table, enriches the Dock rows from the Depara mapping
//! and returns everything as a single multi-sheet workbook.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌────────────┐    ┌───────────┐
//! │  3 files │───▶│  Loader  │───▶│ Normalizer │───▶│ Transform │──┐
//! │ xlsx/csv │    │ (as text)│    │ (header    │    │ (signs,   │  │
//! └──────────┘    └──────────┘    │  detect)   │    │  lcto)    │  │
//!                                 └────────────┘    └───────────┘  │
//!                       ┌──────────┐    ┌────────┐                 │
//!                       │ Workbook │◀───│ Merger │◀────────────────┘
//!                       │  (xlsx)  │    │ (left  │
//!                       └──────────┘    │  join) │
//!                                       └────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let output = conciliator::pipeline::run(&dock, &matera, &depara)?;
//! std::fs::write("dock_matera_depara.xlsx", output.workbook)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - RawTable / Table data model
//! - [`loader`] - Spreadsheet and delimited loading, everything as text
//! - [`normalize`] - Header detection and cleanup
//! - [`transform`] - Dock and Matera column rules
//! - [`merge`] - Left join for Depara enrichment
//! - [`writer`] - Multi-sheet workbook output
//! - [`pipeline`] - End-to-end orchestration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod table;

// Loading
pub mod loader;

// Normalization and transformation
pub mod merge;
pub mod normalize;
pub mod transform;

// Output
pub mod writer;

// Orchestration
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    LoadError, MergeError, NormalizeError, PipelineError, StageError,
    TransformError, WriteError,
};

// =============================================================================
// Re-exports - Data model
// =============================================================================

pub use table::{Cell, Column, RawTable, Table};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{decode_content, detect_encoding, load_delimited, load_spreadsheet};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use normalize::{normalize, AnchorColumn, FirstRow, HeaderLocator, PLACEHOLDER_PREFIX};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    apply_sign, coerce_lenient, parse_comma_decimal, sequence_ids, transform_dock,
    transform_matera, DOCK_DEBIT_CODES, MATERA_DEBIT_CODE, SEQUENCE_COLUMN,
};

// =============================================================================
// Re-exports - Merge and output
// =============================================================================

pub use merge::left_join;
pub use writer::write_workbook;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    run, PipelineOutput, PipelineSummary, ENRICHMENT_COLUMNS, HEADER_ANCHOR_COLUMN,
    MATERA_DELIMITER, OUTPUT_FILE_NAME,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
