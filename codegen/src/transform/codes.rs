//! Normalization of classification code rows into [`ClassificationCode`]
//! records, expanding code ranges where the scheme uses them.

use super::fields::FieldReader;
use super::layout::{CodeField, CodeLayout, OnInvalidRow, TableField};
use super::normalize::{normalize_rows, Normalized};
use super::operations::{expand_code_token, parent_code};
use crate::error::{FieldResult, GenerateResult};
use crate::models::{ClassificationCode, CodeValue};
use crate::parser::Table;

/// Build the records of one row: one per code in the row's code token.
pub fn normalize_code_row<T: CodeValue>(
    reader: &FieldReader<'_, CodeField>,
    layout: &CodeLayout,
) -> FieldResult<Vec<ClassificationCode<T>>> {
    let field = CodeField::Code.name();
    let codes = reader.required_with(CodeField::Code, |cell| {
        expand_code_token::<T>(field, &cell.to_string(), layout.expand_ranges)
    })?;
    let description = reader.required(CodeField::Description)?;

    codes
        .into_iter()
        .map(|(code, text)| {
            let parent = if layout.derive_parents {
                parent_code::<T>(field, &text)?
            } else {
                None
            };
            Ok(ClassificationCode {
                code,
                parent_code: parent,
                description: description.clone(),
            })
        })
        .collect()
}

/// Normalize every row of a code table, in input order.
pub fn normalize_codes<T: CodeValue>(
    table: &Table,
    layout: &CodeLayout,
    on_invalid: OnInvalidRow,
) -> GenerateResult<Normalized<ClassificationCode<T>>> {
    let columns = layout.sheet.resolve(table)?;
    let result = normalize_rows(table, &columns, on_invalid, |reader| {
        normalize_code_row::<T>(reader, layout)
    })?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FieldError, GenerateError};
    use crate::parser::parse_csv;

    fn naics(csv: &str) -> GenerateResult<Normalized<ClassificationCode<u32>>> {
        let table = parse_csv(csv, ',').unwrap();
        normalize_codes::<u32>(&table, &CodeLayout::naics(), OnInvalidRow::Abort)
    }

    #[test]
    fn test_range_and_single_rows() {
        let result = naics("Seq,Code,Title\n1,10-12,Sector A\n2,20,Sector B").unwrap();

        let codes: Vec<u32> = result.records.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![10, 11, 12, 20]);
        assert!(result.records.iter().all(|c| c.parent_code.is_none()));
        assert!(result.records[..3].iter().all(|c| c.description == "Sector A"));
        assert_eq!(result.records[3].description, "Sector B");
    }

    #[test]
    fn test_parents_are_structural() {
        let result = naics("Seq,Code,Title\n1,541,Professional Services\n2,5412,Accounting\n3,54121,Accounting Services").unwrap();

        let parents: Vec<Option<u32>> = result.records.iter().map(|c| c.parent_code).collect();
        assert_eq!(parents, vec![Some(54), Some(541), Some(5412)]);
    }

    #[test]
    fn test_range_members_get_parents() {
        let result = naics("Seq,Code,Title\n1,441-443,Retail").unwrap();

        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0].parent_code, Some(44));
        assert_eq!(result.records[2].code, 443);
    }

    #[test]
    fn test_sic_has_no_parents() {
        let table = parse_csv("Code,Description\n0100,Agricultural production-crops\n2011,Meat packing plants", ',').unwrap();
        let result = normalize_codes::<u16>(&table, &CodeLayout::us_sic(), OnInvalidRow::Abort).unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].code, 100);
        assert_eq!(result.records[0].description, "Agricultural production-crops");
        assert!(result.records.iter().all(|c| c.parent_code.is_none()));
    }

    #[test]
    fn test_missing_description_aborts() {
        let err = naics("Seq,Code,Title\n1,11,Agriculture\n2,21,").unwrap_err();
        match err {
            GenerateError::Row(row) => {
                assert_eq!(row.line, 3);
                assert_eq!(row.source, FieldError::missing("description"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_range_skipped() {
        let table = parse_csv("Seq,Code,Title\n1,31-,Manufacturing\n2,42,Wholesale", ',').unwrap();
        let result = normalize_codes::<u32>(&table, &CodeLayout::naics(), OnInvalidRow::Skip).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].code, 42);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].reason.contains("31-"));
    }
}
