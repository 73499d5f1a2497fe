//! Filter selection types
//!
//! `FilterConfig` is what the merchant picked in the audience builder. It is
//! permissive: a half-filled or mistyped form (null lists, a bare string where
//! a list belongs, a blank amount, a numeric date) deserializes and reads as
//! "criterion inactive".

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// The merchant's selection across all criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Countries and/or region names ("North America")
    #[serde(default, deserialize_with = "lenient_list")]
    pub location: Vec<String>,
    /// Product ids, product titles, collection titles or product types
    #[serde(default, deserialize_with = "lenient_list")]
    pub products: Vec<String>,
    /// Time-of-day and day-of-week bucket labels
    #[serde(default, deserialize_with = "lenient_list")]
    pub timing: Vec<String>,
    /// Payment method labels
    #[serde(default, deserialize_with = "lenient_list")]
    pub payment: Vec<String>,
    /// Delivery method labels
    #[serde(default, deserialize_with = "lenient_list")]
    pub delivery: Vec<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub amount_spent: Option<AmountSpentFilter>,
    /// ISO date (`2024-06-01`) or RFC 3339 timestamp
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub customer_created_from: Option<String>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_products<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timing<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timing = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_payment<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payment = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delivery<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delivery = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_amount_spent(mut self, amount: f64, operator: SpendOperator) -> Self {
        self.amount_spent = Some(AmountSpentFilter {
            amount: serde_json::json!(amount),
            operator: operator.as_str().to_string(),
        });
        self
    }

    pub fn with_created_from(mut self, date: impl Into<String>) -> Self {
        self.customer_created_from = Some(date.into());
        self
    }

    /// Parsed `customerCreatedFrom`, truncated to the (UTC) day
    pub fn created_from_date(&self) -> Option<NaiveDate> {
        self.customer_created_from.as_deref().and_then(parse_day)
    }

    /// Parsed `amountSpent`, `None` when missing or malformed
    pub fn spend_threshold(&self) -> Option<SpendThreshold> {
        self.amount_spent.as_ref().and_then(AmountSpentFilter::threshold)
    }
}

/// Trimmed, non-blank entries of a multi-select list
pub fn selected(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Raw `amountSpent` selection as the form submits it
///
/// `amount` stays a JSON value because forms send numbers, numeric strings
/// and blanks interchangeably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountSpentFilter {
    #[serde(default)]
    pub amount: serde_json::Value,
    #[serde(default)]
    pub operator: String,
}

impl AmountSpentFilter {
    pub fn threshold(&self) -> Option<SpendThreshold> {
        let amount = match &self.amount {
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok()?,
            serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok()?,
            _ => return None,
        };
        let operator = SpendOperator::parse(&self.operator)?;
        Some(SpendThreshold { amount, operator })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendOperator {
    /// spend >= amount
    Min,
    /// spend <= amount
    Max,
}

impl SpendOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl std::fmt::Display for SpendOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A well-formed spend comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendThreshold {
    pub amount: Decimal,
    pub operator: SpendOperator,
}

impl SpendThreshold {
    pub fn admits(&self, spend: Decimal) -> bool {
        match self.operator {
            SpendOperator::Min => spend >= self.amount,
            SpendOperator::Max => spend <= self.amount,
        }
    }
}

/// Parse a date or timestamp and truncate it to its UTC day
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// String entries of a JSON array; any other shape is an empty list
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => values,
        _ => return Ok(Vec::new()),
    };
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// `T` when the value has the right shape, otherwise `T::default()`
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ui_payload() {
        let cfg: FilterConfig = serde_json::from_value(serde_json::json!({
            "location": ["North America"],
            "products": null,
            "amountSpent": {"amount": 100, "operator": "min"},
            "customerCreatedFrom": "2024-06-01"
        }))
        .unwrap();

        assert_eq!(cfg.location, vec!["North America".to_string()]);
        assert!(cfg.products.is_empty());
        assert!(cfg.timing.is_empty());
        assert_eq!(
            cfg.spend_threshold(),
            Some(SpendThreshold {
                amount: Decimal::from(100),
                operator: SpendOperator::Min
            })
        );
        assert_eq!(
            cfg.created_from_date(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }

    #[test]
    fn test_mistyped_fields_are_inactive() {
        let payloads = [
            serde_json::json!({"amountSpent": {"amount": 100, "operator": null}}),
            serde_json::json!({"amountSpent": ""}),
            serde_json::json!({"amountSpent": [100, "min"]}),
            serde_json::json!({"customerCreatedFrom": 20240601}),
            serde_json::json!({"customerCreatedFrom": {"date": "2024-06-01"}}),
            serde_json::json!({"timing": "Morning"}),
            serde_json::json!({"location": {"country": "Canada"}}),
            serde_json::json!({"payment": 3, "delivery": true, "products": "Hoodie"}),
        ];
        for payload in payloads {
            let cfg: FilterConfig = serde_json::from_value(payload.clone())
                .unwrap_or_else(|e| panic!("{} rejected: {}", payload, e));
            assert!(cfg.spend_threshold().is_none(), "{}", payload);
            assert!(cfg.created_from_date().is_none(), "{}", payload);
            for list in [&cfg.location, &cfg.products, &cfg.timing, &cfg.payment, &cfg.delivery] {
                assert!(selected(list).is_empty(), "{}", payload);
            }
        }
    }

    #[test]
    fn test_mixed_list_keeps_strings() {
        let cfg: FilterConfig = serde_json::from_value(serde_json::json!({
            "location": ["Canada", 7, null, "Japan"],
            "customerCreatedFrom": null
        }))
        .unwrap();
        assert_eq!(cfg.location, vec!["Canada".to_string(), "Japan".to_string()]);
        assert!(cfg.customer_created_from.is_none());
    }

    #[test]
    fn test_malformed_amount_is_inactive() {
        let blank = AmountSpentFilter {
            amount: serde_json::json!(""),
            operator: "min".into(),
        };
        let words = AmountSpentFilter {
            amount: serde_json::json!("lots"),
            operator: "min".into(),
        };
        let bad_op = AmountSpentFilter {
            amount: serde_json::json!(10),
            operator: "between".into(),
        };
        assert!(blank.threshold().is_none());
        assert!(words.threshold().is_none());
        assert!(bad_op.threshold().is_none());
    }

    #[test]
    fn test_numeric_string_amount() {
        let f = AmountSpentFilter {
            amount: serde_json::json!(" 49.50 "),
            operator: "MAX".into(),
        };
        let t = f.threshold().unwrap();
        assert_eq!(t.operator, SpendOperator::Max);
        assert!(t.admits(Decimal::from_str("49.50").unwrap()));
        assert!(!t.admits(Decimal::from_str("49.51").unwrap()));
    }

    #[test]
    fn test_parse_day() {
        let june_first = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_day("2024-06-01"), june_first);
        assert_eq!(parse_day("2024-06-01T23:59:00Z"), june_first);
        assert_eq!(parse_day("2024-06-01T23:30:00-02:00"), NaiveDate::from_ymd_opt(2024, 6, 2));
        assert_eq!(parse_day("2024-06-01T10:00:00"), june_first);
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("yesterday"), None);
    }

    #[test]
    fn test_selected_skips_blanks() {
        let values = vec![" Canada ".to_string(), "".to_string(), "  ".to_string()];
        assert_eq!(selected(&values), vec!["Canada"]);
    }
}
