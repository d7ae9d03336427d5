//! High-level generation API: read a source, normalize it, render Rust.
//!
//! # Example
//!
//! ```rust,ignore
//! use refdata::transform::pipeline::{generate_codes, CodeOptions};
//! use refdata::transform::layout::CodeLayout;
//!
//! let options = CodeOptions::new(CodeLayout::naics());
//! let generated = generate_codes(Path::new("2-6 digit_2017_Codes.csv"), &options)?;
//! print!("{}", generated.source);
//! ```

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::codes::normalize_codes;
use super::layout::{
    CodeLayout, CodeWidth, DatesLayout, MarketLayout, OnInvalidRow, StatusPolicy,
};
use super::markets::{normalize_markets, MarketRules};
use super::normalize::{Normalized, SkippedRow};
use crate::emit::{render_code_file, render_market_file};
use crate::error::{FieldError, GenerateResult, SourceError};
use crate::models::{ClassificationCode, CodeValue, MarketRegistration, Provenance, RegistryDates};
use crate::parser::workbook::read_sheet_rows;
use crate::parser::{read_table, Cell, SourceKind};

/// Options for generating a market registry table.
#[derive(Debug, Clone)]
pub struct MarketOptions {
    pub layout: MarketLayout,
    pub status_policy: StatusPolicy,
    pub on_invalid: OnInvalidRow,
    /// Fetch label; the header comment is emitted only when set.
    pub fetched: Option<String>,
    pub generated: NaiveDate,
}

impl MarketOptions {
    pub fn new(layout: MarketLayout) -> Self {
        Self {
            layout,
            status_policy: StatusPolicy::default(),
            on_invalid: OnInvalidRow::default(),
            fetched: None,
            generated: chrono::Local::now().date_naive(),
        }
    }
}

/// Options for generating a classification code table.
#[derive(Debug, Clone)]
pub struct CodeOptions {
    pub layout: CodeLayout,
    pub on_invalid: OnInvalidRow,
    /// Fetch label; the header comment is emitted only when set.
    pub fetched: Option<String>,
    pub generated: NaiveDate,
}

impl CodeOptions {
    pub fn new(layout: CodeLayout) -> Self {
        Self {
            layout,
            on_invalid: OnInvalidRow::default(),
            fetched: None,
            generated: chrono::Local::now().date_naive(),
        }
    }
}

/// Rendered source plus what went into it.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Generated Rust source.
    pub source: String,
    /// Number of table entries emitted.
    pub record_count: usize,
    pub skipped: Vec<SkippedRow>,
}

// =============================================================================
// Markets
// =============================================================================

/// Normalize every configured sheet of a registry file, in layout order.
///
/// CSV input holds a single table, so only the first sheet layout applies.
pub fn load_markets(path: &Path, options: &MarketOptions) -> GenerateResult<Normalized<MarketRegistration>> {
    let kind = SourceKind::from_path(path)?;
    let sheets = match kind {
        SourceKind::Csv => &options.layout.sheets[..options.layout.sheets.len().min(1)],
        SourceKind::Workbook => &options.layout.sheets[..],
    };

    let rules = MarketRules {
        months: &options.layout.months,
        status_policy: options.status_policy,
    };

    let mut result = Normalized::new();
    for sheet in sheets {
        let table = read_table(path, sheet.selector())?;
        debug!(sheet = sheet.sheet, rows = table.rows.len(), "normalizing registry sheet");
        result.extend(normalize_markets(&table, sheet, rules, options.on_invalid)?);
    }

    info!("registry: {}", result.summary());
    Ok(result)
}

/// Generate the market table source for a registry file.
pub fn generate_markets(path: &Path, options: &MarketOptions) -> GenerateResult<GeneratedFile> {
    let markets = load_markets(path, options)?;

    let dates = match (SourceKind::from_path(path)?, &options.layout.dates) {
        (SourceKind::Workbook, Some(layout)) => read_registry_dates(path, layout)?,
        _ => None,
    };

    let provenance = options.fetched.as_ref().map(|fetched| Provenance {
        source: options.layout.source.clone(),
        fetched: fetched.clone(),
        generated: options.generated,
    });

    let source = render_market_file(&markets.records, provenance.as_ref(), dates.as_ref());
    Ok(GeneratedFile {
        source,
        record_count: markets.records.len(),
        skipped: markets.skipped,
    })
}

/// Read the registry's publication dates from their sheet.
///
/// Returns `None` when the workbook has no such sheet.
pub fn read_registry_dates(path: &Path, layout: &DatesLayout) -> GenerateResult<Option<RegistryDates>> {
    let rows = match read_sheet_rows(path, layout.sheet) {
        Ok(rows) => rows,
        Err(SourceError::MissingSheet(sheet)) => {
            warn!(sheet, "registry dates sheet not found, skipping date accessors");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let cell_at = |row: usize| {
        rows.iter()
            .find(|r| r.line == row + 1)
            .map(|r| r.get(layout.value_column).clone())
            .unwrap_or(Cell::Empty)
    };

    let dates = RegistryDates {
        last_modified: cell_date("last_modified", &cell_at(layout.first_row))?,
        next_publication: cell_date("next_publication", &cell_at(layout.first_row + 1))?,
    };
    info!(
        last_modified = %dates.last_modified,
        next_publication = %dates.next_publication,
        "registry dates"
    );
    Ok(Some(dates))
}

/// A date from a cell holding a date value or a date in common text forms.
pub fn cell_date(field: &str, cell: &Cell) -> Result<NaiveDate, FieldError> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%d %B %Y", "%B %d, %Y", "%d/%m/%Y"];

    match cell {
        Cell::Empty => Err(FieldError::missing(field)),
        Cell::Date(date) => Ok(*date),
        other => {
            let text = other.to_string();
            FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
                .ok_or_else(|| FieldError::unrecognized(field, &text, "not a date"))
        }
    }
}

// =============================================================================
// Classification Codes
// =============================================================================

/// Normalize a classification code file.
pub fn load_codes<T: CodeValue>(
    path: &Path,
    options: &CodeOptions,
) -> GenerateResult<Normalized<ClassificationCode<T>>> {
    let table = read_table(path, options.layout.sheet.selector())?;
    debug!(rows = table.rows.len(), "normalizing code table");

    let result = normalize_codes::<T>(&table, &options.layout, options.on_invalid)?;
    info!("codes: {}", result.summary());
    Ok(result)
}

/// Generate the code table source for a classification file, using the
/// layout's code width.
pub fn generate_codes(path: &Path, options: &CodeOptions) -> GenerateResult<GeneratedFile> {
    match options.layout.width {
        CodeWidth::U16 => generate_codes_as::<u16>(path, options),
        CodeWidth::U32 => generate_codes_as::<u32>(path, options),
    }
}

fn generate_codes_as<T: CodeValue>(path: &Path, options: &CodeOptions) -> GenerateResult<GeneratedFile> {
    let codes = load_codes::<T>(path, options)?;

    let provenance = options.fetched.as_ref().map(|fetched| Provenance {
        source: options
            .layout
            .source
            .clone()
            .unwrap_or_else(|| path.display().to_string()),
        fetched: fetched.clone(),
        generated: options.generated,
    });

    let source = render_code_file(&codes.records, provenance.as_ref());
    Ok(GeneratedFile {
        source,
        record_count: codes.records.len(),
        skipped: codes.skipped,
    })
}
