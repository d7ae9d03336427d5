//! Error types for the generation pipeline.
//!
//! One enum per stage:
//!
//! - [`SourceError`] - reading CSV files and workbooks
//! - [`FieldError`] - extracting and transforming a single field
//! - [`RowError`] - a field error located in the input
//! - [`LayoutError`] - loading and resolving column layouts
//! - [`GenerateError`] - top-level errors returned by the pipeline
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! stage boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading a tabular source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or a sheet could not be read.
    #[error("Invalid workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Requested sheet index does not exist.
    #[error("Workbook has no sheet at index {0}")]
    MissingSheet(usize),

    /// A named column from the layout is not among the headers.
    #[error("Column '{0}' not found in headers")]
    MissingColumn(String),

    /// No header row.
    #[error("Source has no header row")]
    Empty,

    /// File extension is not a known CSV or workbook format.
    #[error("Unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

// =============================================================================
// Field Errors
// =============================================================================

/// Errors while extracting one field from a row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// A required field is empty or not-a-number.
    #[error("Missing required field '{field}'")]
    MissingRequiredField { field: String },

    /// A value could not be transformed.
    #[error("Unrecognized value '{token}' for field '{field}': {reason}")]
    UnrecognizedToken {
        field: String,
        token: String,
        reason: String,
    },
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        FieldError::MissingRequiredField {
            field: field.into(),
        }
    }

    pub fn unrecognized(
        field: impl Into<String>,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FieldError::UnrecognizedToken {
            field: field.into(),
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            FieldError::MissingRequiredField { field } => field,
            FieldError::UnrecognizedToken { field, .. } => field,
        }
    }
}

/// A field error together with the row it occurred in.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}: {source} (row: {row})")]
pub struct RowError {
    /// One-based line (CSV) or row (sheet) number.
    pub line: usize,
    /// The full row, rendered for diagnostics.
    pub row: String,
    #[source]
    pub source: FieldError,
}

// =============================================================================
// Layout Errors
// =============================================================================

/// Errors while loading or resolving a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// IO error.
    #[error("Layout IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Layout JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field has no column assigned.
    #[error("Required field '{0}' has no column in the layout")]
    UnmappedField(String),

    /// A market layout with no sheets.
    #[error("Layout lists no sheets")]
    NoSheets,
}

// =============================================================================
// Generate Errors (top-level)
// =============================================================================

/// Top-level generation errors.
///
/// This is the error type returned by [`crate::transform::pipeline`].
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Source reading error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Invalid row with abort policy.
    #[error("Row error: {0}")]
    Row(#[from] RowError),

    /// Layout error.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Field error outside of any row (registry dates).
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for field operations.
pub type FieldResult<T> = Result<T, FieldError>;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Result type for pipeline operations.
pub type GenerateResult<T> = Result<T, GenerateError>;
