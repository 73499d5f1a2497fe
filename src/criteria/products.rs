//! Product / collection / category criterion
//!
//! A selection value may be a product id, a product title, a collection title
//! or a product type. Every membership test is tried for every value; ids
//! resolved from titles ahead of time (see `lookup`) join the id test.

use super::{same_text, Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::{orders_fragment, Selection};
use audience_types::{selected, CandidateRecord, FilterConfig, ProductRef};

const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

pub fn is_product_gid(value: &str) -> bool {
    value.trim().starts_with(PRODUCT_GID_PREFIX)
}

/// `gid://shopify/Product/42` matches `gid://shopify/Product/42` and `42`
fn id_matches(product_id: &str, wanted: &str) -> bool {
    product_id == wanted
        || (!wanted.is_empty()
            && wanted.chars().all(|c| c.is_ascii_digit())
            && product_id.rsplit('/').next() == Some(wanted))
}

fn product_matches(product: &ProductRef, wanted: &str) -> bool {
    id_matches(&product.id, wanted)
        || product.title.as_deref().is_some_and(|t| same_text(t, wanted))
        || product
            .product_type
            .as_deref()
            .is_some_and(|t| same_text(t, wanted))
}

pub struct ProductsCriterion;

impl Criterion for ProductsCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::Products
    }

    fn is_active(&self, config: &FilterConfig) -> bool {
        !selected(&config.products).is_empty()
    }

    fn fragment(&self, limits: &CompilerLimits) -> Vec<Selection> {
        let line_items = Selection::node(
            "lineItems",
            vec![Selection::node(
                "nodes",
                vec![Selection::node(
                    "product",
                    vec![
                        Selection::leaf("id"),
                        Selection::leaf("title"),
                        Selection::leaf("productType"),
                    ],
                )],
            )],
        )
        .with_args(format!("first: {}", limits.line_items_per_order));
        vec![orders_fragment(limits, vec![line_items])]
    }

    fn needs_order_data(&self) -> bool {
        true
    }

    fn cost(&self) -> u8 {
        4
    }

    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        let wanted = selected(&ctx.config.products);
        let resolved = &ctx.resolved.product_ids;
        record
            .orders()
            .iter()
            .flat_map(|o| o.line_items())
            .filter_map(|li| li.product.as_ref())
            .any(|p| resolved.contains(&p.id) || wanted.iter().any(|w| product_matches(p, w)))
    }

    fn describe(&self, config: &FilterConfig) -> String {
        format!("Products: {}", selected(&config.products).join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::ResolvedSelections;
    use audience_types::{Connection, LineItem, OrderSummary};

    fn buyer(products: Vec<ProductRef>) -> CandidateRecord {
        let items = products
            .into_iter()
            .map(|p| LineItem { product: Some(p) })
            .collect::<Vec<_>>();
        CandidateRecord {
            id: "gid://shopify/Customer/1".into(),
            orders: Some(Connection::from(vec![OrderSummary {
                line_items: Some(Connection::from(items)),
                ..Default::default()
            }])),
            ..Default::default()
        }
    }

    fn hoodie() -> ProductRef {
        ProductRef {
            id: "gid://shopify/Product/42".into(),
            title: Some("Classic Hoodie".into()),
            product_type: Some("Apparel".into()),
        }
    }

    fn check(record: &CandidateRecord, cfg: &FilterConfig, resolved: &ResolvedSelections) -> bool {
        ProductsCriterion.matches(record, &MatchContext::new(cfg, resolved))
    }

    #[test]
    fn test_match_by_id_title_or_type() {
        let record = buyer(vec![hoodie()]);
        let none = ResolvedSelections::default();
        for value in ["gid://shopify/Product/42", "42", "classic hoodie", "APPAREL"] {
            let cfg = FilterConfig::new().with_products([value]);
            assert!(check(&record, &cfg, &none), "{}", value);
        }
        let cfg = FilterConfig::new().with_products(["Sneakers", "4"]);
        assert!(!check(&record, &cfg, &none));
    }

    #[test]
    fn test_resolved_collection_ids() {
        let record = buyer(vec![hoodie()]);
        let cfg = FilterConfig::new().with_products(["Winter Collection"]);
        let mut resolved = ResolvedSelections::default();
        assert!(!check(&record, &cfg, &resolved));
        resolved.product_ids.insert("gid://shopify/Product/42".into());
        assert!(check(&record, &cfg, &resolved));
    }

    #[test]
    fn test_deleted_products_and_no_orders() {
        let cfg = FilterConfig::new().with_products(["Classic Hoodie"]);
        let none = ResolvedSelections::default();
        let deleted = CandidateRecord {
            id: "x".into(),
            orders: Some(Connection::from(vec![OrderSummary {
                line_items: Some(Connection::from(vec![LineItem { product: None }])),
                ..Default::default()
            }])),
            ..Default::default()
        };
        assert!(!check(&deleted, &cfg, &none));
        assert!(!check(&CandidateRecord::default(), &cfg, &none));
    }

    #[test]
    fn test_is_product_gid() {
        assert!(is_product_gid("gid://shopify/Product/1"));
        assert!(!is_product_gid("gid://shopify/Collection/1"));
        assert!(!is_product_gid("Hoodie"));
    }
}
