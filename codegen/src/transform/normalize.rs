//! Row-by-row normalization driver shared by every data source.

use tracing::warn;

use super::fields::FieldReader;
use super::layout::{Columns, OnInvalidRow, TableField};
use crate::error::{FieldResult, RowError};
use crate::parser::Table;

/// Records produced from a table, plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<R> {
    pub records: Vec<R>,
    pub skipped: Vec<SkippedRow>,
}

/// A row left out under [`OnInvalidRow::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

impl<R> Normalized<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Append another table's results after this one's.
    pub fn extend(&mut self, other: Normalized<R>) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records, {} rows skipped",
            self.records.len(),
            self.skipped.len()
        )
    }
}

impl<R> Default for Normalized<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `normalize_row` over every row in input order.
///
/// A row may produce any number of records. On the first failing row,
/// `Abort` returns the located error; `Skip` logs it and moves on.
pub fn normalize_rows<F, R>(
    table: &Table,
    columns: &Columns<F>,
    on_invalid: OnInvalidRow,
    mut normalize_row: impl FnMut(&FieldReader<'_, F>) -> FieldResult<Vec<R>>,
) -> Result<Normalized<R>, RowError>
where
    F: TableField,
{
    let mut result = Normalized::new();

    for row in &table.rows {
        let reader = FieldReader::new(row, columns);
        match normalize_row(&reader) {
            Ok(records) => result.records.extend(records),
            Err(err) => {
                let err = reader.locate(err);
                match on_invalid {
                    OnInvalidRow::Abort => return Err(err),
                    OnInvalidRow::Skip => {
                        warn!(line = err.line, field = err.source.field(), "skipping row: {}", err);
                        result.skipped.push(SkippedRow {
                            line: err.line,
                            reason: err.source.to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::parser::parse_csv;
    use crate::transform::layout::{CodeField, ColumnRef, SheetLayout};

    fn code_columns(table: &Table) -> Columns<CodeField> {
        SheetLayout {
            sheet: 0,
            header_row: 0,
            columns: [
                (CodeField::Code, ColumnRef::Index(0)),
                (CodeField::Description, ColumnRef::Index(1)),
            ]
            .into_iter()
            .collect(),
        }
        .resolve(table)
        .unwrap()
    }

    fn descriptions(reader: &FieldReader<'_, CodeField>) -> FieldResult<Vec<String>> {
        Ok(vec![reader.required(CodeField::Description)?])
    }

    #[test]
    fn test_abort_on_first_invalid_row() {
        let table = parse_csv("code,desc\n1,a\n2,\n3,c", ',').unwrap();
        let columns = code_columns(&table);

        let err = normalize_rows(&table, &columns, OnInvalidRow::Abort, descriptions).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.source, FieldError::missing("description"));
    }

    #[test]
    fn test_skip_invalid_rows() {
        let table = parse_csv("code,desc\n1,a\n2,\n3,c", ',').unwrap();
        let columns = code_columns(&table);

        let result = normalize_rows(&table, &columns, OnInvalidRow::Skip, descriptions).unwrap();
        assert_eq!(result.records, vec!["a", "c"]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].line, 3);
        assert_eq!(result.summary(), "2 records, 1 rows skipped");
    }
}
