//! Market registry tables: `HashMap<String, Market>` keyed by MIC.

use super::{
    date_expr, optional, owned_string, render_date_accessor, render_header, render_table_fn,
};
use crate::models::{MarketRegistration, Provenance, RegistryDates};

/// One `(mic, Market { .. })` entry.
pub fn render_market_entry(market: &MarketRegistration) -> String {
    let fields = [
        ("mic", owned_string(&market.mic)),
        ("country_code", owned_string(&market.country_code)),
        ("country", owned_string(&market.country)),
        ("description", owned_string(&market.description)),
        (
            "status",
            optional(market.status, |s| format!("MarketStatus::{}", s.variant())),
        ),
        ("mic_type", optional(market.mic_type.as_deref(), owned_string)),
        ("city", optional(market.city.as_deref(), owned_string)),
        ("operating_mic", optional(market.operating_mic.as_deref(), owned_string)),
        ("acronym", optional(market.acronym.as_deref(), owned_string)),
        ("website", optional(market.website.as_deref(), owned_string)),
        ("last_updated", optional(market.last_updated, date_expr)),
        ("created", optional(market.created, date_expr)),
        ("comments", optional(market.comments.as_deref(), owned_string)),
    ];

    let mut out = format!("        ({}, Market {{\n", owned_string(&market.mic));
    for (name, value) in fields {
        out.push_str(&format!("            {}: {},\n", name, value));
    }
    out.push_str("        }),\n");
    out
}

/// The `create_data_table` function over all markets, in order.
pub fn render_market_table(markets: &[MarketRegistration]) -> String {
    let entries: Vec<String> = markets.iter().map(render_market_entry).collect();
    render_table_fn("String", "Market", &entries)
}

/// A complete generated registry file.
pub fn render_market_file(
    markets: &[MarketRegistration],
    provenance: Option<&Provenance>,
    dates: Option<&RegistryDates>,
) -> String {
    let mut out = String::new();
    if let Some(provenance) = provenance {
        out.push_str(&render_header(provenance));
    }
    if let Some(dates) = dates {
        out.push_str(&render_date_accessor("last_modified", dates.last_modified));
        out.push_str(&render_date_accessor("next_publication", dates.next_publication));
    }
    out.push_str(&render_market_table(markets));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketStatus;
    use chrono::NaiveDate;

    fn xpar() -> MarketRegistration {
        MarketRegistration {
            mic: "XPAR".into(),
            country_code: "FR".into(),
            country: "FRANCE".into(),
            description: "EURONEXT - EURONEXT PARIS".into(),
            status: Some(MarketStatus::Active),
            operating_mic: Some("XPAR".into()),
            mic_type: Some("O".into()),
            acronym: None,
            city: Some("PARIS".into()),
            website: Some("www.euronext.com".into()),
            last_updated: NaiveDate::from_ymd_opt(2001, 3, 1),
            created: None,
            comments: Some("see \"notes\"".into()),
        }
    }

    #[test]
    fn test_market_entry() {
        let entry = render_market_entry(&xpar());

        assert!(entry.starts_with("        (\"XPAR\".to_string(), Market {\n"));
        assert!(entry.contains("            mic: \"XPAR\".to_string(),\n"));
        assert!(entry.contains("            status: Some(MarketStatus::Active),\n"));
        assert!(entry.contains("            acronym: None,\n"));
        assert!(entry.contains("            website: Some(\"www.euronext.com\".to_string()),\n"));
        assert!(entry.contains(
            "            last_updated: Some(NaiveDate::from_ymd_opt(2001, 3, 1).unwrap()),\n"
        ));
        assert!(entry.contains("            created: None,\n"));
        assert!(entry.contains("            comments: Some(\"see \\\"notes\\\"\".to_string()),\n"));
        assert!(entry.ends_with("        }),\n"));
    }

    #[test]
    fn test_required_fields_never_wrapped() {
        let entry = render_market_entry(&xpar());
        assert!(entry.contains("            country: \"FRANCE\".to_string(),\n"));
        assert!(!entry.contains("country: Some("));
    }

    #[test]
    fn test_market_file_order() {
        let mut xetr = xpar();
        xetr.mic = "XETR".into();

        let dates = RegistryDates {
            last_modified: NaiveDate::from_ymd_opt(2019, 4, 8).unwrap(),
            next_publication: NaiveDate::from_ymd_opt(2019, 5, 13).unwrap(),
        };
        let out = render_market_file(&[xpar(), xetr], None, Some(&dates));

        let last_modified = out.find("pub fn last_modified()").unwrap();
        let next = out.find("pub fn next_publication()").unwrap();
        let table = out.find("fn create_data_table() -> HashMap<String, Market>").unwrap();
        let xpar_at = out.find("(\"XPAR\".to_string(), Market").unwrap();
        let xetr_at = out.find("(\"XETR\".to_string(), Market").unwrap();

        assert!(last_modified < next && next < table && table < xpar_at && xpar_at < xetr_at);
        assert!(!out.contains("DO NOT MODIFY"));
    }
}
