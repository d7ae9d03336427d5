//! # Refdata - Rust table generation for market and industry reference data
//!
//! Refdata reads the ISO 10383 MIC registry and NAICS / SIC code lists
//! (workbooks or CSV) and renders them as Rust source building a `HashMap`
//! table, for embedding in another crate.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XLS / CSV   │────▶│   Parser    │────▶│  Transform  │────▶│    Emit     │
//! │  (ISO/UTF8) │     │ (auto-enc)  │     │  (layouts)  │     │ (Rust src)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use refdata::{generate_codes, CodeLayout, CodeOptions};
//!
//! let options = CodeOptions::new(CodeLayout::naics());
//! let generated = generate_codes(Path::new("naics.csv"), &options)?;
//! print!("{}", generated.source);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Normalized records (MarketRegistration, ClassificationCode)
//! - [`parser`] - CSV and workbook reading with auto-detection
//! - [`transform`] - Layouts, normalizers and pipeline
//! - [`emit`] - Rust source rendering

// Core modules
pub mod error;
pub mod models;

// Reading
pub mod parser;

// Normalization
pub mod transform;

// Rendering
pub mod emit;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    FieldError, GenerateError, GenerateResult, LayoutError, RowError, SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ClassificationCode, CodeValue, MarketRegistration, MarketStatus, Provenance, RegistryDates,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_csv, read_table, Cell, Row,
    SheetSelector, SourceKind, Table,
};

// =============================================================================
// Re-exports - Layouts
// =============================================================================

pub use transform::layout::{
    CodeLayout, CodeWidth, MarketLayout, MonthTable, OnInvalidRow, StatusPolicy,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    generate_codes, generate_markets, CodeOptions, GeneratedFile, MarketOptions,
};
