//! Rendering of normalized records as Rust source.
//!
//! Every renderer is a pure function returning a `String`; writing it out is
//! left to the caller. A generated file is laid out as:
//!
//! ```text
//! /* header comment */          optional, from a Provenance
//! pub fn last_modified() ...    optional date accessors
//! fn create_data_table() ...    one entry per record
//! ```

pub mod codes;
pub mod markets;

pub use codes::{render_code_entry, render_code_file, render_code_table};
pub use markets::{render_market_entry, render_market_file, render_market_table};

use chrono::{Datelike, NaiveDate};

use crate::models::Provenance;

const RULE: &str =
    "// ------------------------------------------------------------------------------------------------";

/// A Rust string literal for `value`, with quotes and control characters
/// escaped.
pub fn string_literal(value: &str) -> String {
    format!("{:?}", value)
}

/// `"value".to_string()`
pub fn owned_string(value: &str) -> String {
    format!("{}.to_string()", string_literal(value))
}

/// `Some(..)` around a rendered value, or `None`.
pub fn optional<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    match value {
        Some(v) => format!("Some({})", render(v)),
        None => "None".to_string(),
    }
}

/// An expression building `date` at runtime.
pub fn date_expr(date: NaiveDate) -> String {
    format!(
        "NaiveDate::from_ymd_opt({}, {}, {}).unwrap()",
        date.year(),
        date.month(),
        date.day()
    )
}

/// The "do not modify" comment block opening a generated file.
pub fn render_header(provenance: &Provenance) -> String {
    format!(
        "/*\n\
         DO NOT MODIFY THIS FILE\n\
         =======================\n\
         Generated from:\n  <{}>\n\
         Fetched:\n  {}\n\
         Generated on:\n  {}\n\
         */\n",
        provenance.source,
        provenance.fetched,
        provenance.generated.format("%Y-%m-%d")
    )
}

/// A public function returning a fixed date.
pub fn render_date_accessor(name: &str, date: NaiveDate) -> String {
    format!(
        "\npub fn {}() -> NaiveDate {{\n    {}\n}}\n",
        name,
        date_expr(date)
    )
}

/// Wrap rendered entries in the `create_data_table` function.
pub(crate) fn render_table_fn(key_type: &str, value_type: &str, entries: &[String]) -> String {
    let map_type = format!("HashMap<{}, {}>", key_type, value_type);
    let mut out = String::new();

    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n// Generated Data Table\n");
    out.push_str(RULE);
    out.push_str("\n\n#[allow(clippy::unreadable_literal)]\n");
    out.push_str(&format!("fn create_data_table() -> {} {{\n", map_type));
    out.push_str(&format!("    let table: {} = [\n", map_type));
    for entry in entries {
        out.push_str(entry);
    }
    out.push_str("    ]\n    .iter()\n    .cloned()\n    .collect();\n    table\n}\n");
    out
}
