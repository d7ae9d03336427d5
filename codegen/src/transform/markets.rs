//! Normalization of MIC registry rows into [`MarketRegistration`] records.

use super::fields::FieldReader;
use super::layout::{MarketField, MonthTable, OnInvalidRow, SheetLayout, StatusPolicy, TableField};
use super::normalize::{normalize_rows, Normalized};
use super::operations::{lowercase, map_status, parse_registry_date};
use crate::error::{FieldResult, GenerateResult};
use crate::models::MarketRegistration;
use crate::parser::Table;

/// Settings shared by every registry row.
#[derive(Debug, Clone, Copy)]
pub struct MarketRules<'a> {
    pub months: &'a MonthTable,
    pub status_policy: StatusPolicy,
}

/// Build one registration from a row.
pub fn normalize_market(
    reader: &FieldReader<'_, MarketField>,
    rules: MarketRules<'_>,
) -> FieldResult<MarketRegistration> {
    use MarketField::*;

    let date = |field: MarketField| {
        reader.optional_with(field, |cell| {
            parse_registry_date(field.name(), cell, rules.months)
        })
    };

    Ok(MarketRegistration {
        mic: reader.required(Mic)?,
        country_code: reader.required(CountryCode)?,
        country: reader.required(Country)?,
        description: reader.required(Description)?,
        status: reader.optional_with(Status, |cell| {
            Ok(map_status(&cell.to_string(), rules.status_policy))
        })?,
        mic_type: reader.optional(MicType),
        city: reader.optional(City),
        operating_mic: reader.optional(OperatingMic),
        acronym: reader.optional(Acronym),
        website: reader.optional_with(Website, |cell| Ok(Some(lowercase(cell))))?,
        last_updated: date(LastUpdated)?,
        created: date(Created)?,
        comments: reader.optional_with(Comments, |cell| Ok(Some(lowercase(cell))))?,
    })
}

/// Normalize every row of one registry sheet.
pub fn normalize_markets(
    table: &Table,
    sheet: &SheetLayout<MarketField>,
    rules: MarketRules<'_>,
    on_invalid: OnInvalidRow,
) -> GenerateResult<Normalized<MarketRegistration>> {
    let columns = sheet.resolve(table)?;
    let result = normalize_rows(table, &columns, on_invalid, |reader| {
        normalize_market(reader, rules).map(|market| vec![market])
    })?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FieldError, GenerateError};
    use crate::models::MarketStatus;
    use crate::parser::parse_csv;
    use crate::transform::layout::ColumnRef;
    use chrono::NaiveDate;

    const HEADER: &str = "COUNTRY|ISO|MIC|OPERATING MIC|O/S|NAME|ACRONYM|CITY|WEBSITE|UPDATED|STATUS|CREATED|COMMENTS";

    fn sheet() -> SheetLayout<MarketField> {
        use MarketField::*;
        let columns = [
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
        SheetLayout {
            sheet: 0,
            header_row: 0,
            columns: columns.into_iter().collect(),
        }
    }

    fn run(rows: &str, policy: StatusPolicy) -> GenerateResult<Normalized<MarketRegistration>> {
        let table = parse_csv(&format!("{}\n{}", HEADER, rows), '|').unwrap();
        let months = MonthTable::default();
        let rules = MarketRules {
            months: &months,
            status_policy: policy,
        };
        normalize_markets(&table, &sheet(), rules, OnInvalidRow::Abort)
    }

    #[test]
    fn test_full_row() {
        let result = run(
            "FRANCE|FR|XPAR|XPAR|O|EURONEXT - EURONEXT PARIS|EURONEXT|PARIS|WWW.EURONEXT.COM|MARCH 2001|ACTIVE|BEFORE JUNE 2005|SEE \"NOTES\"",
            StatusPolicy::Fallback,
        )
        .unwrap();

        let market = &result.records[0];
        assert_eq!(market.mic, "XPAR");
        assert_eq!(market.country_code, "FR");
        assert_eq!(market.country, "FRANCE");
        assert_eq!(market.description, "EURONEXT - EURONEXT PARIS");
        assert_eq!(market.status, Some(MarketStatus::Active));
        assert_eq!(market.mic_type.as_deref(), Some("O"));
        assert_eq!(market.operating_mic.as_deref(), Some("XPAR"));
        assert_eq!(market.website.as_deref(), Some("www.euronext.com"));
        assert_eq!(market.last_updated, NaiveDate::from_ymd_opt(2001, 3, 1));
        assert_eq!(market.created, None);
        assert_eq!(market.comments.as_deref(), Some("see \"notes\""));
    }

    #[test]
    fn test_optional_fields_absent() {
        let result = run("GERMANY|DE|XETR||||||||||", StatusPolicy::Fallback).unwrap_err();
        // description is required
        assert!(matches!(
            result,
            GenerateError::Row(ref e) if e.source == FieldError::missing("description")
        ));

        let result = run("GERMANY|DE|XETR|||XETRA|||||||", StatusPolicy::Fallback).unwrap();
        let market = &result.records[0];
        assert_eq!(market.status, None);
        assert_eq!(market.city, None);
        assert_eq!(market.website, None);
        assert_eq!(market.last_updated, None);
    }

    #[test]
    fn test_unknown_status_policies() {
        let row = "FRANCE|FR|XPAR||O|EURONEXT PARIS|||||UPDATED||";

        let fallback = run(row, StatusPolicy::Fallback).unwrap();
        assert_eq!(fallback.records[0].status, Some(MarketStatus::NotOperational));

        let absent = run(row, StatusPolicy::Absent).unwrap();
        assert_eq!(absent.records[0].status, None);
    }

    #[test]
    fn test_missing_mic_aborts() {
        let err = run("FRANCE|FR|N/A||O|EURONEXT PARIS|||||ACTIVE||", StatusPolicy::Fallback).unwrap_err();
        match err {
            GenerateError::Row(row) => {
                assert_eq!(row.source, FieldError::missing("mic"));
                assert_eq!(row.line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_date_aborts() {
        let err = run("FRANCE|FR|XPAR||O|EURONEXT PARIS|||||ACTIVE|SMARCH 2001|", StatusPolicy::Fallback)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Row(ref e) if e.source.field() == "created"
        ));
    }
}
