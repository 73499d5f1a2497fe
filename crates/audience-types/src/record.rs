//! Customer records as fetched from the Admin API
//!
//! Every field past `id` is optional: the fetch only selects what the active
//! criteria need, and the API returns `null` freely.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// One customer node from a `customers` page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub created_at: Option<String>,
    /// `UnsignedInt64` arrives as a JSON string
    #[serde(default, deserialize_with = "count_from_string_or_number")]
    pub number_of_orders: Option<u64>,
    #[serde(default)]
    pub amount_spent: Option<Money>,
    #[serde(default)]
    pub default_address: Option<Address>,
    #[serde(default)]
    pub orders: Option<Connection<OrderSummary>>,
}

impl CandidateRecord {
    /// Recent orders, empty when not fetched
    pub fn orders(&self) -> &[OrderSummary] {
        self.orders.as_ref().map(|c| c.nodes.as_slice()).unwrap_or(&[])
    }

    /// Country name from the default address
    pub fn country(&self) -> Option<&str> {
        self.default_address
            .as_ref()
            .and_then(|a| a.country.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// ISO country code from the default address
    pub fn country_code(&self) -> Option<&str> {
        self.default_address
            .as_ref()
            .and_then(|a| a.country_code_v2.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// Lifetime spend, zero when absent or unparseable
    pub fn spend(&self) -> Decimal {
        self.amount_spent
            .as_ref()
            .and_then(Money::value)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref()?)
    }
}

/// GraphQL connection, `nodes` form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> From<Vec<T>> for Connection<T> {
    fn from(nodes: Vec<T>) -> Self {
        Self { nodes }
    }
}

/// `MoneyV2`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal scalar, serialized as a string by the API
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

impl Money {
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            currency_code: Some(currency_code.into()),
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        Decimal::from_str(self.amount.as_deref()?.trim()).ok()
    }
}

/// `MoneyBag`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBag {
    #[serde(default)]
    pub shop_money: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code_v2: Option<String>,
}

/// Recent order summary nested under a customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(default)]
    pub created_at: Option<String>,
    /// `OrderDisplayFinancialStatus` (PAID, PENDING, AUTHORIZED, ...)
    #[serde(default)]
    pub display_financial_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payment_gateway_names: Vec<String>,
    #[serde(default)]
    pub line_items: Option<Connection<LineItem>>,
    #[serde(default)]
    pub shipping_lines: Option<Connection<ShippingLine>>,
}

impl OrderSummary {
    pub fn line_items(&self) -> &[LineItem] {
        self.line_items
            .as_ref()
            .map(|c| c.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn shipping_lines(&self) -> &[ShippingLine] {
        self.shipping_lines
            .as_ref()
            .map(|c| c.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref()?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// `null` when the product has since been deleted
    #[serde(default)]
    pub product: Option<ProductRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingLine {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_price_set: Option<MoneyBag>,
}

impl ShippingLine {
    pub fn price(&self) -> Option<Decimal> {
        self.original_price_set
            .as_ref()?
            .shop_money
            .as_ref()?
            .value()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `"12"`, `12` or `null` for count scalars
fn count_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct CountVisitor;

    impl<'de> de::Visitor<'de> for CountVisitor {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an unsigned integer, a numeric string or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(u64::try_from(v).ok())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok((v.is_finite() && v >= 0.0).then_some(v as u64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse().ok())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_customer_node() {
        let record: CandidateRecord = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Customer/1",
            "displayName": "Ada Lovelace",
            "email": null,
            "createdAt": "2024-06-01T23:59:00Z",
            "numberOfOrders": "3",
            "amountSpent": {"amount": "129.99", "currencyCode": "USD"},
            "defaultAddress": {"country": "Canada", "countryCodeV2": "CA"},
            "orders": {"nodes": [{
                "createdAt": "2024-06-03T08:15:00Z",
                "displayFinancialStatus": "PAID",
                "paymentGatewayNames": ["shopify_payments"],
                "shippingLines": {"nodes": [{
                    "title": "Express",
                    "originalPriceSet": {"shopMoney": {"amount": "0.0", "currencyCode": "USD"}}
                }]},
                "lineItems": {"nodes": [{"product": null}]}
            }]}
        }))
        .unwrap();

        assert_eq!(record.number_of_orders, Some(3));
        assert_eq!(record.country(), Some("Canada"));
        assert_eq!(record.country_code(), Some("CA"));
        assert_eq!(record.spend(), Decimal::from_str("129.99").unwrap());
        assert_eq!(record.orders().len(), 1);
        let order = &record.orders()[0];
        assert_eq!(order.shipping_lines()[0].price(), Some(Decimal::ZERO));
        assert!(order.line_items()[0].product.is_none());
        assert!(order.created_at_utc().is_some());
    }

    #[test]
    fn test_minimal_node() {
        let record: CandidateRecord =
            serde_json::from_value(serde_json::json!({"id": "gid://shopify/Customer/2"})).unwrap();
        assert_eq!(record.spend(), Decimal::ZERO);
        assert!(record.orders().is_empty());
        assert!(record.country().is_none());
        assert!(record.created_at_utc().is_none());
        assert!(record.number_of_orders.is_none());
    }

    #[test]
    fn test_numeric_order_count() {
        let record: CandidateRecord = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Customer/3",
            "numberOfOrders": 7
        }))
        .unwrap();
        assert_eq!(record.number_of_orders, Some(7));
    }

    #[test]
    fn test_connection_null_nodes() {
        let orders: Connection<OrderSummary> =
            serde_json::from_value(serde_json::json!({"nodes": null})).unwrap();
        assert!(orders.nodes.is_empty());

        let lines: Connection<ShippingLine> =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(lines.nodes.is_empty());

        let items: Connection<LineItem> = serde_json::from_value(serde_json::json!({
            "nodes": [{"product": {"id": "gid://shopify/Product/1"}}]
        }))
        .unwrap();
        assert_eq!(items.nodes.len(), 1);
    }
}
