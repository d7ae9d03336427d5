//! Tabular input: CSV files and workbook sheets, read into a [`Table`].
//!
//! CSV files get encoding and delimiter auto-detection. Workbooks are read
//! through [`workbook`]. Both produce the same [`Cell`] values, with the
//! usual NA tokens already folded into [`Cell::Empty`].

pub mod workbook;

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Raw values treated as missing, in addition to NaN floats and error cells.
///
/// Matching happens after trimming, so whitespace-only cells and padded
/// tokens such as `" N/A "` are missing as well.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "N/A", "NULL", "NaN", "n/a", "nan", "null",
];

// =============================================================================
// Cells, Rows, Tables
// =============================================================================

/// A single value read from a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

pub(crate) static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Build a cell from raw text, trimming it and folding NA tokens.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NA_VALUES.contains(&trimmed) {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Build a cell from a float, folding NaN.
    pub fn from_number(value: f64) -> Self {
        if value.is_nan() {
            Cell::Empty
        } else {
            Cell::Number(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text form of the value, `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            // Integral floats come from numeric code columns
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// One data row with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// One-based line (CSV) or row (sheet) number.
    pub line: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(line: usize, cells: Vec<Cell>) -> Self {
        Self { line, cells }
    }

    /// Cell at `index`, or an empty cell past the end of a short row.
    pub fn get(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }

    /// The whole row as text, for diagnostics.
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_missing)
    }
}

/// A parsed source: headers plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Position of a header by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }
}

// =============================================================================
// Encoding and Delimiter Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        // WHATWG maps the latin1 labels onto windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// CSV
// =============================================================================

/// Parse CSV text with an explicit delimiter.
///
/// The first record is the header. Backslash escapes are honored inside
/// quoted fields, blank lines are skipped and short rows are allowed.
///
/// # Example
/// ```ignore
/// let table = parse_csv("Code,Title\n11,Agriculture", ',')?;
/// assert_eq!(table.rows[0].get(0).to_string(), "11");
/// ```
pub fn parse_csv(content: &str, delimiter: char) -> SourceResult<Table> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| SourceError::Encoding(format!("delimiter '{}' is not ASCII", delimiter)))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .escape(Some(b'\\'))
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::Empty);
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        let row = Row::new(line, record.iter().map(Cell::from_text).collect());
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(Table { headers, rows })
}

/// Parse CSV bytes with auto-detection of encoding and, unless given, delimiter.
pub fn parse_csv_bytes(bytes: &[u8], delimiter: Option<char>) -> SourceResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    debug!(%encoding, ?delimiter, "decoded CSV");
    parse_csv(&content, delimiter)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Kind of input, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Workbook,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(SourceKind::Csv),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(SourceKind::Workbook),
            _ => Err(SourceError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Where to find the table inside an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetSelector {
    /// Zero-based sheet index, ignored for CSV.
    pub sheet: usize,
    /// Zero-based index of the header row, ignored for CSV.
    pub header_row: usize,
}

/// Read a table from a CSV file or from one sheet of a workbook.
pub fn read_table(path: &Path, selector: SheetSelector) -> SourceResult<Table> {
    match SourceKind::from_path(path)? {
        SourceKind::Csv => {
            let bytes = std::fs::read(path)?;
            parse_csv_bytes(&bytes, None)
        }
        SourceKind::Workbook => workbook::read_sheet_table(path, selector),
    }
}
