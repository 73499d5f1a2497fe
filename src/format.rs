//! Caller-facing result shape

use audience_types::{CandidateRecord, FilteredResult, Money};
use rust_decimal::RoundingStrategy;

const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN_COUNTRY: &str = "Unknown";
const NO_MONEY: &str = "0.00";

fn or_na(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// `M/D/YYYY`, or "N/A" for missing, unparseable or epoch-zero timestamps
pub fn format_date(record: &CandidateRecord) -> String {
    match record.created_at_utc() {
        Some(at) if at.timestamp() != 0 => at.format("%-m/%-d/%Y").to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// "123.40 USD"; "0.00" when the amount is missing or unparseable
pub fn format_money(money: Option<&Money>) -> String {
    let Some(money) = money else {
        return NO_MONEY.to_string();
    };
    let Some(value) = money.value() else {
        return NO_MONEY.to_string();
    };
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    match money.currency_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => format!("{} {}", rounded, code),
        _ => rounded.to_string(),
    }
}

/// Total: every record formats, whatever it is missing
pub fn format_record(record: &CandidateRecord) -> FilteredResult {
    FilteredResult {
        id: record.id.clone(),
        name: or_na(record.display_name.as_deref()),
        email: or_na(record.email.as_deref()),
        country: record.country().unwrap_or(UNKNOWN_COUNTRY).to_string(),
        created_at: format_date(record),
        orders_count: record.number_of_orders.unwrap_or(0),
        total_spent: format_money(record.amount_spent.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audience_types::Address;

    #[test]
    fn test_full_record() {
        let record = CandidateRecord {
            id: "gid://shopify/Customer/5".into(),
            display_name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            created_at: Some("2024-03-07T10:00:00Z".into()),
            number_of_orders: Some(4),
            amount_spent: Some(Money::new("123.4", "CAD")),
            default_address: Some(Address {
                country: Some("Canada".into()),
                country_code_v2: Some("CA".into()),
            }),
            orders: None,
        };
        let out = format_record(&record);
        assert_eq!(out.name, "Ada Lovelace");
        assert_eq!(out.country, "Canada");
        assert_eq!(out.created_at, "3/7/2024");
        assert_eq!(out.orders_count, 4);
        assert_eq!(out.total_spent, "123.40 CAD");
    }

    #[test]
    fn test_empty_record() {
        let out = format_record(&CandidateRecord::default());
        assert_eq!(out.name, "N/A");
        assert_eq!(out.email, "N/A");
        assert_eq!(out.country, "Unknown");
        assert_eq!(out.created_at, "N/A");
        assert_eq!(out.orders_count, 0);
        assert_eq!(out.total_spent, "0.00");
    }

    #[test]
    fn test_odd_values() {
        let record = CandidateRecord {
            display_name: Some("   ".into()),
            created_at: Some("1970-01-01T00:00:00Z".into()),
            amount_spent: Some(Money {
                amount: Some("abc".into()),
                currency_code: Some("USD".into()),
            }),
            ..Default::default()
        };
        let out = format_record(&record);
        assert_eq!(out.name, "N/A");
        assert_eq!(out.created_at, "N/A");
        assert_eq!(out.total_spent, "0.00");
    }

    #[test]
    fn test_money_rounding() {
        assert_eq!(format_money(Some(&Money::new("10.005", "EUR"))), "10.01 EUR");
        assert_eq!(format_money(Some(&Money::new("7", "USD"))), "7.00 USD");
    }
}
