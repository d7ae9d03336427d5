//! Layout definitions: which source column feeds which record field.
//!
//! Layouts are plain serde structs. The built-in defaults describe the
//! published ISO 10383, NAICS and SEC SIC files; any of them can be dumped
//! to JSON, edited, and loaded back.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenerateResult, LayoutError, LayoutResult, SourceError};
use crate::parser::{SheetSelector, Table};

/// Published location of the ISO 10383 registry workbook.
pub const MIC_REGISTRY_URL: &str =
    "https://www.iso20022.org/sites/default/files/ISO10383_MIC/ISO10383_MIC.xls";

// =============================================================================
// Fields
// =============================================================================

/// A record field that can be read from a column.
pub trait TableField: Copy + Ord + fmt::Debug + 'static {
    /// Every field of the record, in emission order.
    const ALL: &'static [Self];

    /// Field name used in diagnostics and layout files.
    fn name(self) -> &'static str;

    fn is_required(self) -> bool;
}

/// Fields of a [`crate::models::MarketRegistration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketField {
    Mic,
    CountryCode,
    Country,
    Description,
    Status,
    MicType,
    City,
    OperatingMic,
    Acronym,
    Website,
    LastUpdated,
    Created,
    Comments,
}

impl TableField for MarketField {
    const ALL: &'static [Self] = &[
        MarketField::Mic,
        MarketField::CountryCode,
        MarketField::Country,
        MarketField::Description,
        MarketField::Status,
        MarketField::MicType,
        MarketField::City,
        MarketField::OperatingMic,
        MarketField::Acronym,
        MarketField::Website,
        MarketField::LastUpdated,
        MarketField::Created,
        MarketField::Comments,
    ];

    fn name(self) -> &'static str {
        match self {
            MarketField::Mic => "mic",
            MarketField::CountryCode => "country_code",
            MarketField::Country => "country",
            MarketField::Description => "description",
            MarketField::Status => "status",
            MarketField::MicType => "mic_type",
            MarketField::City => "city",
            MarketField::OperatingMic => "operating_mic",
            MarketField::Acronym => "acronym",
            MarketField::Website => "website",
            MarketField::LastUpdated => "last_updated",
            MarketField::Created => "created",
            MarketField::Comments => "comments",
        }
    }

    fn is_required(self) -> bool {
        matches!(
            self,
            MarketField::Mic | MarketField::CountryCode | MarketField::Country | MarketField::Description
        )
    }
}

/// Fields of a [`crate::models::ClassificationCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeField {
    Code,
    Description,
}

impl TableField for CodeField {
    const ALL: &'static [Self] = &[CodeField::Code, CodeField::Description];

    fn name(self) -> &'static str {
        match self {
            CodeField::Code => "code",
            CodeField::Description => "description",
        }
    }

    fn is_required(self) -> bool {
        true
    }
}

// =============================================================================
// Columns
// =============================================================================

/// A column, either by header name or by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    pub fn name(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

/// Column positions resolved against one table's headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns<F> {
    indexes: BTreeMap<F, usize>,
}

impl<F: TableField> Columns<F> {
    /// Position of the column feeding `field`, if the layout maps it.
    pub fn index(&self, field: F) -> Option<usize> {
        self.indexes.get(&field).copied()
    }
}

/// Field-to-column mapping for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "F: Serialize",
    deserialize = "F: Deserialize<'de> + Ord"
))]
pub struct SheetLayout<F> {
    /// Zero-based sheet index, ignored for CSV input.
    #[serde(default)]
    pub sheet: usize,

    /// Zero-based header row, ignored for CSV input.
    #[serde(default)]
    pub header_row: usize,

    pub columns: BTreeMap<F, ColumnRef>,
}

impl<F: TableField> SheetLayout<F> {
    pub fn selector(&self) -> SheetSelector {
        SheetSelector {
            sheet: self.sheet,
            header_row: self.header_row,
        }
    }

    /// Resolve every mapped column against the table headers.
    ///
    /// Fails when a required field is unmapped or a named column is absent.
    pub fn resolve(&self, table: &Table) -> GenerateResult<Columns<F>> {
        for field in F::ALL {
            if field.is_required() && !self.columns.contains_key(field) {
                return Err(LayoutError::UnmappedField(field.name().to_string()).into());
            }
        }

        let mut indexes = BTreeMap::new();
        for (field, column) in &self.columns {
            let index = match column {
                ColumnRef::Index(i) => *i,
                ColumnRef::Name(name) => table
                    .column_index(name)
                    .ok_or_else(|| SourceError::MissingColumn(name.clone()))?,
            };
            indexes.insert(*field, index);
        }

        Ok(Columns { indexes })
    }
}

// =============================================================================
// Lookup Tables and Policies
// =============================================================================

/// Month names to month numbers, used by the registry date parser.
///
/// Names are stored uppercased, whether built in code or loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, u32>", into = "HashMap<String, u32>")]
pub struct MonthTable(HashMap<String, u32>);

impl From<HashMap<String, u32>> for MonthTable {
    fn from(entries: HashMap<String, u32>) -> Self {
        MonthTable::new(entries)
    }
}

impl From<MonthTable> for HashMap<String, u32> {
    fn from(table: MonthTable) -> Self {
        table.0
    }
}

impl MonthTable {
    pub fn new(entries: impl IntoIterator<Item = (String, u32)>) -> Self {
        MonthTable(
            entries
                .into_iter()
                .map(|(name, month)| (name.to_uppercase(), month))
                .collect(),
        )
    }

    /// Month number for a name, ignoring case.
    pub fn month(&self, name: &str) -> Option<u32> {
        self.0.get(&name.trim().to_uppercase()).copied()
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        const ENGLISH: [&str; 12] = [
            "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE", "JULY", "AUGUST", "SEPTEMBER",
            "OCTOBER", "NOVEMBER", "DECEMBER",
        ];
        MonthTable::new(
            ENGLISH
                .iter()
                .zip(1..)
                .map(|(name, month)| (name.to_string(), month)),
        )
    }
}

/// What an unrecognized registry status becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Map to `MarketStatus::NotOperational`.
    #[default]
    Fallback,
    /// Leave the status absent.
    Absent,
}

/// What the pipeline does with a row that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnInvalidRow {
    /// Stop and return the row error.
    #[default]
    Abort,
    /// Record the row as skipped and continue.
    Skip,
}

// =============================================================================
// Market Layout
// =============================================================================

/// Where the registry publication dates sit in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatesLayout {
    pub sheet: usize,
    /// Zero-based row holding the last modification date; the next
    /// publication date is on the row below.
    pub first_row: usize,
    /// Zero-based column holding both dates.
    pub value_column: usize,
}

/// Layout of the MIC registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketLayout {
    /// Where the data was published, for the generated header.
    pub source: String,

    /// Sheets read in order; their records are concatenated.
    pub sheets: Vec<SheetLayout<MarketField>>,

    #[serde(default)]
    pub dates: Option<DatesLayout>,

    #[serde(default)]
    pub months: MonthTable,
}

impl MarketLayout {
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        let layout: Self = serde_json::from_str(json)?;
        if layout.sheets.is_empty() {
            return Err(LayoutError::NoSheets);
        }
        Ok(layout)
    }

    pub fn from_file(path: &Path) -> LayoutResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> LayoutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for MarketLayout {
    fn default() -> Self {
        use MarketField::*;

        // Current entries: unnamed headers are addressed by position.
        let current = [
            (Country, ColumnRef::name("COUNTRY")),
            (CountryCode, ColumnRef::Index(1)),
            (Mic, ColumnRef::name("MIC")),
            (OperatingMic, ColumnRef::Index(3)),
            (MicType, ColumnRef::Index(4)),
            (Description, ColumnRef::Index(5)),
            (Acronym, ColumnRef::name("ACRONYM")),
            (City, ColumnRef::name("CITY")),
            (Website, ColumnRef::name("WEBSITE")),
            (LastUpdated, ColumnRef::Index(9)),
            (Status, ColumnRef::name("STATUS")),
            (Created, ColumnRef::Index(11)),
            (Comments, ColumnRef::name("COMMENTS")),
        ];

        // The changes sheet puts the description before the operating MIC.
        let changes = [
            (Country, ColumnRef::name("COUNTRY")),
            (CountryCode, ColumnRef::Index(1)),
            (Mic, ColumnRef::name("MIC")),
            (Description, ColumnRef::Index(3)),
            (OperatingMic, ColumnRef::Index(4)),
            (MicType, ColumnRef::Index(5)),
            (Acronym, ColumnRef::name("ACRONYM")),
            (City, ColumnRef::name("CITY")),
            (Website, ColumnRef::name("WEBSITE")),
            (LastUpdated, ColumnRef::Index(9)),
            (Status, ColumnRef::name("STATUS")),
            (Created, ColumnRef::Index(11)),
            (Comments, ColumnRef::name("COMMENTS")),
        ];

        Self {
            source: MIC_REGISTRY_URL.to_string(),
            sheets: vec![
                SheetLayout {
                    sheet: 0,
                    header_row: 0,
                    columns: current.into_iter().collect(),
                },
                SheetLayout {
                    sheet: 7,
                    header_row: 0,
                    columns: changes.into_iter().collect(),
                },
            ],
            dates: Some(DatesLayout {
                sheet: 8,
                first_row: 2,
                value_column: 1,
            }),
            months: MonthTable::default(),
        }
    }
}

// =============================================================================
// Code Layout
// =============================================================================

/// Integer width of a classification scheme's codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeWidth {
    U16,
    U32,
}

/// Layout of a classification code list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeLayout {
    /// Where the data was published; the input path is used when absent.
    #[serde(default)]
    pub source: Option<String>,

    pub width: CodeWidth,

    #[serde(flatten)]
    pub sheet: SheetLayout<CodeField>,

    /// Expand "A-B" code tokens into every code in the range.
    #[serde(default)]
    pub expand_ranges: bool,

    /// Derive parent codes by dropping the last digit.
    #[serde(default)]
    pub derive_parents: bool,
}

impl CodeLayout {
    /// NAICS: code in the second column, title in the third.
    pub fn naics() -> Self {
        Self {
            source: None,
            width: CodeWidth::U32,
            sheet: SheetLayout {
                sheet: 0,
                header_row: 0,
                columns: [
                    (CodeField::Code, ColumnRef::Index(1)),
                    (CodeField::Description, ColumnRef::Index(2)),
                ]
                .into_iter()
                .collect(),
            },
            expand_ranges: true,
            derive_parents: true,
        }
    }

    /// US SIC as published by the SEC: flat list, no hierarchy.
    pub fn us_sic() -> Self {
        Self {
            source: None,
            width: CodeWidth::U16,
            sheet: SheetLayout {
                sheet: 0,
                header_row: 0,
                columns: [
                    (CodeField::Code, ColumnRef::name("Code")),
                    (CodeField::Description, ColumnRef::name("Description")),
                ]
                .into_iter()
                .collect(),
            },
            expand_ranges: false,
            derive_parents: false,
        }
    }

    pub fn from_json(json: &str) -> LayoutResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> LayoutResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> LayoutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
