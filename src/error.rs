//! Error types for the reconciliation pipeline.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`LoadError`] - raw tabular loading errors (spreadsheet / delimited text)
//! - [`NormalizeError`] - header detection and cleanup errors
//! - [`TransformError`] - column coercion and renaming errors
//! - [`MergeError`] - left-join errors
//! - [`WriteError`] - workbook serialization errors
//! - [`PipelineError`] - top-level orchestration errors, attributed to an input
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading a byte stream into a raw table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The stream could not be opened as a spreadsheet.
    #[error("Failed to open spreadsheet: {0}")]
    Spreadsheet(String),

    /// The spreadsheet contains no worksheets.
    #[error("Spreadsheet has no worksheets")]
    NoWorksheet,

    /// Failed to decode delimited text.
    #[error("Failed to decode text: {0}")]
    Encoding(String),

    /// Invalid delimited data.
    #[error("Invalid delimited data: {0}")]
    Csv(#[from] csv::Error),

    /// The stream is empty.
    #[error("Input is empty")]
    Empty,
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors while locating and promoting the header row.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The anchor column is never populated, so no header row exists.
    #[error("No header row found: column {anchor} is never populated")]
    HeaderNotFound { anchor: usize },

    /// The raw table has no rows at all.
    #[error("Table is empty")]
    EmptyTable,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while applying field-specific coercion rules.
#[derive(Debug, Error)]
pub enum TransformError {
    /// An expected column is absent.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A strictly-parsed amount was not numeric.
    #[error("Invalid amount in column '{column}', row {row}: '{value}'")]
    InvalidAmount {
        column: String,
        row: usize,
        value: String,
    },
}

// =============================================================================
// Merge Errors
// =============================================================================

/// Errors while joining two tables.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The join key or an enrichment column is absent.
    #[error("Missing column '{column}' in {side} table")]
    MissingColumn { side: &'static str, column: String },
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while serializing the output workbook.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The workbook could not be built.
    #[error("Failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Stage Errors
// =============================================================================

/// Any failure while preparing one of the three inputs.
///
/// The variant says which step of the load → normalize → transform chain
/// failed; [`PipelineError`] adds which input it failed for.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::run`].
/// A stage failure is always attributed to the input that caused it so the
/// caller can tell the user which of the three uploads is malformed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The Dock export failed to load, normalize or transform.
    #[error("Dock: {0}")]
    Dock(#[source] StageError),

    /// The Matera export failed to load, normalize or transform.
    #[error("Matera: {0}")]
    Matera(#[source] StageError),

    /// The Depara mapping failed to load or normalize.
    #[error("Depara: {0}")]
    Depara(#[source] StageError),

    /// The enrichment join failed.
    #[error("Merge: {0}")]
    Merge(#[from] MergeError),

    /// The output workbook could not be written.
    #[error("Workbook: {0}")]
    Write(#[from] WriteError),
}

impl PipelineError {
    /// Name of the input this failure is attributed to, if any.
    pub fn input(&self) -> Option<&'static str> {
        match self {
            PipelineError::Dock(_) => Some("Dock"),
            PipelineError::Matera(_) => Some("Matera"),
            PipelineError::Depara(_) => Some("Depara"),
            PipelineError::Merge(_) | PipelineError::Write(_) => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for normalization operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Result type for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
