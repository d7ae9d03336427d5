//! Transformation module.
//!
//! This module turns parsed tables into normalized records:
//! - Layout: field-to-column mappings and policies
//! - Operations: status, date, range and parent transformers
//! - Markets / Codes: per-source row normalizers
//! - Pipeline: read, normalize and render in one call

pub mod codes;
pub mod fields;
pub mod layout;
pub mod markets;
pub mod normalize;
pub mod operations;
pub mod pipeline;

pub use codes::{normalize_code_row, normalize_codes};
pub use fields::FieldReader;
pub use layout::{
    CodeField, CodeLayout, CodeWidth, ColumnRef, DatesLayout, MarketField, MarketLayout,
    MonthTable, OnInvalidRow, SheetLayout, StatusPolicy, TableField,
};
pub use markets::{normalize_market, normalize_markets, MarketRules};
pub use normalize::{normalize_rows, Normalized, SkippedRow};
pub use pipeline::{
    generate_codes, generate_markets, CodeOptions, GeneratedFile, MarketOptions,
};
