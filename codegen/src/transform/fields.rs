//! Field extraction from a single row.
//!
//! A [`FieldReader`] pairs a row with resolved column positions and hands
//! out values with the presence rules every normalizer relies on:
//!
//! - required + missing → [`FieldError::MissingRequiredField`]
//! - optional + missing → `None`, the transformer is not called
//! - optional + present → transformer result, which may itself be `None`
//! - required + present → transformer result, unwrapped

use super::layout::{Columns, TableField};
use crate::error::{FieldError, FieldResult, RowError};
use crate::parser::{Cell, Row, EMPTY_CELL};

pub struct FieldReader<'a, F> {
    row: &'a Row,
    columns: &'a Columns<F>,
}

impl<'a, F: TableField> FieldReader<'a, F> {
    pub fn new(row: &'a Row, columns: &'a Columns<F>) -> Self {
        Self { row, columns }
    }

    /// The cell feeding `field`; unmapped fields read as empty.
    pub fn cell(&self, field: F) -> &'a Cell {
        match self.columns.index(field) {
            Some(index) => self.row.get(index),
            None => &EMPTY_CELL,
        }
    }

    /// Required field as text.
    pub fn required(&self, field: F) -> FieldResult<String> {
        self.required_with(field, |cell| Ok(cell.to_string()))
    }

    /// Required field passed through `transform`.
    pub fn required_with<T>(
        &self,
        field: F,
        transform: impl FnOnce(&Cell) -> FieldResult<T>,
    ) -> FieldResult<T> {
        let cell = self.cell(field);
        if cell.is_missing() {
            return Err(FieldError::missing(field.name()));
        }
        transform(cell)
    }

    /// Optional field as text.
    pub fn optional(&self, field: F) -> Option<String> {
        self.cell(field).as_text()
    }

    /// Optional field passed through `transform`, which may report absence.
    pub fn optional_with<T>(
        &self,
        field: F,
        transform: impl FnOnce(&Cell) -> FieldResult<Option<T>>,
    ) -> FieldResult<Option<T>> {
        let cell = self.cell(field);
        if cell.is_missing() {
            return Ok(None);
        }
        transform(cell)
    }

    /// Attach this row's position and text to a field error.
    pub fn locate(&self, source: FieldError) -> RowError {
        RowError {
            line: self.row.line,
            row: self.row.render(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv;
    use crate::transform::layout::{CodeField, ColumnRef, SheetLayout};

    fn columns(table: &crate::parser::Table) -> Columns<CodeField> {
        SheetLayout {
            sheet: 0,
            header_row: 0,
            columns: [
                (CodeField::Code, ColumnRef::name("Code")),
                (CodeField::Description, ColumnRef::name("Description")),
            ]
            .into_iter()
            .collect(),
        }
        .resolve(table)
        .unwrap()
    }

    #[test]
    fn test_required_present() {
        let table = parse_csv("Code,Description\n5412,Accounting", ',').unwrap();
        let columns = columns(&table);
        let reader = FieldReader::new(&table.rows[0], &columns);

        assert_eq!(reader.required(CodeField::Code).unwrap(), "5412");
        let len = reader
            .required_with(CodeField::Description, |c| Ok(c.to_string().len()))
            .unwrap();
        assert_eq!(len, 10);
    }

    #[test]
    fn test_required_missing() {
        let table = parse_csv("Code,Description\n5412,NaN", ',').unwrap();
        let columns = columns(&table);
        let reader = FieldReader::new(&table.rows[0], &columns);

        let err = reader.required(CodeField::Description).unwrap_err();
        assert_eq!(err, FieldError::missing("description"));
    }

    #[test]
    fn test_optional_missing_skips_transform() {
        let table = parse_csv("Code,Description\n5412,", ',').unwrap();
        let columns = columns(&table);
        let reader = FieldReader::new(&table.rows[0], &columns);

        assert_eq!(reader.optional(CodeField::Description), None);
        let value: Option<String> = reader
            .optional_with(CodeField::Description, |_| panic!("transform called on missing value"))
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_optional_transform_absence_propagates() {
        let table = parse_csv("Code,Description\n5412,BEFORE 1995", ',').unwrap();
        let columns = columns(&table);
        let reader = FieldReader::new(&table.rows[0], &columns);

        let value: Option<String> = reader.optional_with(CodeField::Description, |_| Ok(None)).unwrap();
        assert_eq!(value, None);
        assert_eq!(reader.optional(CodeField::Description), Some("BEFORE 1995".to_string()));
    }

    #[test]
    fn test_locate_carries_row() {
        let table = parse_csv("Code,Description\n5412,", ',').unwrap();
        let columns = columns(&table);
        let reader = FieldReader::new(&table.rows[0], &columns);

        let err = reader.locate(FieldError::missing("description"));
        assert_eq!(err.line, 2);
        assert!(err.row.contains("5412"));
    }
}
