//! Domain models produced by normalization and consumed by the emitter.
//!
//! - [`MarketRegistration`] - one MIC registry entry
//! - [`MarketStatus`] - registry status of a market
//! - [`ClassificationCode`] - one industry classification code
//! - [`CodeValue`] - unsigned integer widths usable as codes
//! - [`RegistryDates`] - publication dates of the MIC registry
//! - [`Provenance`] - where the generated file came from

use std::fmt::{Debug, Display};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Markets
// =============================================================================

/// Status of a market in the MIC registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketStatus {
    Active,
    Deleted,
    NotOperational,
}

impl MarketStatus {
    /// Variant name as written in generated code.
    pub fn variant(&self) -> &'static str {
        match self {
            MarketStatus::Active => "Active",
            MarketStatus::Deleted => "Deleted",
            MarketStatus::NotOperational => "NotOperational",
        }
    }
}

/// One entry of the ISO 10383 market identifier registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketRegistration {
    pub mic: String,
    pub country_code: String,
    pub country: String,
    pub description: String,
    pub status: Option<MarketStatus>,

    pub operating_mic: Option<String>,
    pub mic_type: Option<String>,
    pub acronym: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub last_updated: Option<NaiveDate>,
    pub created: Option<NaiveDate>,
    pub comments: Option<String>,
}

/// Publication dates read from the registry workbook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryDates {
    pub last_modified: NaiveDate,
    pub next_publication: NaiveDate,
}

// =============================================================================
// Classification Codes
// =============================================================================

/// An unsigned integer type used as a classification code.
///
/// Range bounds are parsed as `u64` and narrowed with `TryFrom`.
pub trait CodeValue:
    Copy + Ord + Debug + Display + FromStr + TryFrom<u64> + Into<u64>
{
    /// Type name as written in generated code.
    const TYPE_NAME: &'static str;
}

macro_rules! code_value {
    ($($t:ty),*) => {
        $(
            impl CodeValue for $t {
                const TYPE_NAME: &'static str = stringify!($t);
            }
        )*
    };
}

code_value!(u16, u32, u64);

/// One code of an industry classification scheme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationCode<T> {
    pub code: T,
    pub parent_code: Option<T>,
    pub description: String,
}

// =============================================================================
// Provenance
// =============================================================================

/// Header information for a generated file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provenance {
    /// URL or file the data was generated from.
    pub source: String,
    /// Free-form label for when the data was fetched.
    pub fetched: String,
    /// Date the file was generated.
    pub generated: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_type_names() {
        assert_eq!(<u16 as CodeValue>::TYPE_NAME, "u16");
        assert_eq!(<u32 as CodeValue>::TYPE_NAME, "u32");
    }

    #[test]
    fn test_status_variant_names() {
        assert_eq!(MarketStatus::NotOperational.variant(), "NotOperational");
        assert_eq!(MarketStatus::Active.variant(), "Active");
    }
}
