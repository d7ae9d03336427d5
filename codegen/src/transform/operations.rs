//! Value transformers applied to extracted cells.
//!
//! All lookup tables (months, status policy) are passed in by the caller.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::layout::{MonthTable, StatusPolicy};
use crate::error::{FieldError, FieldResult};
use crate::models::{CodeValue, MarketStatus};
use crate::parser::Cell;

/// Leading token of a registry date that only bounds the real date.
pub const DATE_UNKNOWN_PREFIX: &str = "BEFORE";

static RANGE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").expect("valid range regex"));

// =============================================================================
// Status
// =============================================================================

/// Map a raw registry status.
///
/// "ACTIVE" and "DELETED" match exactly; anything else follows `policy`.
pub fn map_status(raw: &str, policy: StatusPolicy) -> Option<MarketStatus> {
    match raw {
        "ACTIVE" => Some(MarketStatus::Active),
        "DELETED" => Some(MarketStatus::Deleted),
        _ => match policy {
            StatusPolicy::Fallback => Some(MarketStatus::NotOperational),
            StatusPolicy::Absent => None,
        },
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Parse a registry date such as "MARCH 2001" into the first of that month.
///
/// "BEFORE ..." yields `None`. Cells the workbook already stores as dates
/// are returned unchanged.
pub fn parse_registry_date(
    field: &str,
    cell: &Cell,
    months: &MonthTable,
) -> FieldResult<Option<NaiveDate>> {
    let text = match cell {
        Cell::Empty => return Ok(None),
        Cell::Date(date) => return Ok(Some(*date)),
        other => other.to_string(),
    };

    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [first, ..] if first.eq_ignore_ascii_case(DATE_UNKNOWN_PREFIX) => Ok(None),
        [month_name, year] => {
            let month = months
                .month(month_name)
                .ok_or_else(|| FieldError::unrecognized(field, &text, "unknown month name"))?;
            let year: i32 = year
                .parse()
                .map_err(|_| FieldError::unrecognized(field, &text, "year is not a number"))?;

            NaiveDate::from_ymd_opt(year, month, 1)
                .map(Some)
                .ok_or_else(|| FieldError::unrecognized(field, &text, "not a calendar date"))
        }
        _ => Err(FieldError::unrecognized(field, &text, "expected 'MONTH YEAR'")),
    }
}

// =============================================================================
// Strings
// =============================================================================

/// Lowercase a cell's text.
///
/// Quote escaping is left to the emitter, which escapes every string it
/// writes.
pub fn lowercase(cell: &Cell) -> String {
    cell.to_string().to_lowercase()
}

// =============================================================================
// Codes
// =============================================================================

/// Expand a code token into `(code, code text)` pairs.
///
/// With `expand_ranges`, "A-B" yields every code in `A..=B` in ascending
/// order; otherwise, and for plain tokens, a single code. The text keeps the
/// token's own digits (leading zeros included) for parent derivation.
pub fn expand_code_token<T: CodeValue>(
    field: &str,
    token: &str,
    expand_ranges: bool,
) -> FieldResult<Vec<(T, String)>> {
    let token = token.trim();

    if expand_ranges && token.contains('-') {
        let caps = RANGE_TOKEN
            .captures(token)
            .ok_or_else(|| FieldError::unrecognized(field, token, "malformed code range"))?;
        let low = narrow::<T>(field, token, parse_bound(field, token, &caps[1])?)?;
        let high = narrow::<T>(field, token, parse_bound(field, token, &caps[2])?)?;
        if low > high {
            return Err(FieldError::unrecognized(
                field,
                token,
                "range lower bound exceeds upper bound",
            ));
        }

        // Both bounds fit T, so every member does too.
        let (low, high): (u64, u64) = (low.into(), high.into());
        return (low..=high)
            .map(|value| Ok((narrow::<T>(field, token, value)?, value.to_string())))
            .collect();
    }

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::unrecognized(field, token, "code is not an unsigned integer"));
    }
    let value = parse_bound(field, token, token)?;
    Ok(vec![(narrow::<T>(field, token, value)?, token.to_string())])
}

/// Parent of a code: its text without the last digit, absent for codes of
/// two digits or fewer.
pub fn parent_code<T: CodeValue>(field: &str, code_text: &str) -> FieldResult<Option<T>> {
    let digits = code_text.trim();
    if digits.len() <= 2 {
        return Ok(None);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::unrecognized(field, digits, "code is not an unsigned integer"));
    }

    let parent = &digits[..digits.len() - 1];
    let value = parse_bound(field, digits, parent)?;
    narrow::<T>(field, digits, value).map(Some)
}

fn parse_bound(field: &str, token: &str, digits: &str) -> FieldResult<u64> {
    digits
        .parse()
        .map_err(|_| FieldError::unrecognized(field, token, "code is not an unsigned integer"))
}

fn narrow<T: CodeValue>(field: &str, token: &str, value: u64) -> FieldResult<T> {
    T::try_from(value).map_err(|_| {
        FieldError::unrecognized(field, token, format!("code does not fit in {}", T::TYPE_NAME))
    })
}
