//! Workbook sheets (xls, xlsx, ods) read through calamine.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use tracing::debug;

use super::{Cell, Row, SheetSelector, Table};
use crate::error::{SourceError, SourceResult};

/// Read every row of a sheet, with one-based row numbers.
///
/// Rows and columns are positioned as in the sheet itself, even when the
/// used range does not start at A1.
pub fn read_sheet_rows(path: &Path, sheet: usize) -> SourceResult<Vec<Row>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(sheet)
        .ok_or(SourceError::MissingSheet(sheet))??;

    let (first_row, first_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let rows: Vec<Row> = range
        .rows()
        .enumerate()
        .map(|(idx, cells)| {
            let mut converted = vec![Cell::Empty; first_col];
            converted.extend(cells.iter().map(convert_cell));
            Row::new(first_row + idx + 1, converted)
        })
        .collect();

    debug!(sheet, rows = rows.len(), "read workbook sheet");
    Ok(rows)
}

/// Read a sheet as a table whose header sits at `selector.header_row`.
pub fn read_sheet_table(path: &Path, selector: SheetSelector) -> SourceResult<Table> {
    let rows = read_sheet_rows(path, selector.sheet)?;
    rows_to_table(rows, selector.header_row)
}

/// Split raw sheet rows into headers and data rows.
///
/// Rows above the header are dropped, as are blank rows below it.
pub fn rows_to_table(rows: Vec<Row>, header_row: usize) -> SourceResult<Table> {
    let mut rows = rows.into_iter().skip_while(|r| r.line <= header_row);

    let header = rows.next().ok_or(SourceError::Empty)?;
    let headers: Vec<String> = header.cells.iter().map(|c| c.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::Empty);
    }

    let rows = rows.filter(|r| !r.is_blank()).collect();
    Ok(Table { headers, rows })
}

/// Convert a calamine value, folding NA markers into [`Cell::Empty`].
pub fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::from_number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Cell::Date(d.date()))
            .unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::from_text(s)),
        Data::DurationIso(s) => Cell::from_text(s),
    }
}
