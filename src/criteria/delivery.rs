//! Delivery method criterion
//!
//! Shipping-line titles are free text set by the merchant's carriers and
//! rates, so configured methods match through substring patterns. Names with
//! no pattern fall back to exact (case-insensitive) title comparison.

use super::{same_text, Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::{orders_fragment, Selection};
use audience_types::{selected, CandidateRecord, FilterConfig, ShippingLine};
use rust_decimal::Decimal;

const FREE_SHIPPING: &str = "free shipping";

/// method key (lowercase) -> title substrings
pub static SHIPPING_PATTERNS: &[(&str, &[&str])] = &[
    ("express", &["express", "expedited", "priority", "fast"]),
    ("standard", &["standard", "regular", "ground", "economy"]),
    (FREE_SHIPPING, &["free"]),
    ("overnight", &["overnight", "next day", "next-day"]),
    ("local delivery", &["local delivery", "local"]),
    ("local pickup", &["pickup", "pick up", "pick-up", "collect"]),
    ("international", &["international", "worldwide", "global"]),
];

/// Labels offered by the delivery picker
pub static OPTIONS: &[&str] = &[
    "Express",
    "Standard",
    "Free Shipping",
    "Overnight",
    "Local Delivery",
    "Local Pickup",
    "International",
];

/// Exact key first, then the first key the name contains
fn pattern_for(name: &str) -> Option<(&'static str, &'static [&'static str])> {
    let lower = name.trim().to_lowercase();
    SHIPPING_PATTERNS
        .iter()
        .find(|(key, _)| *key == lower)
        .or_else(|| SHIPPING_PATTERNS.iter().find(|(key, _)| lower.contains(key)))
        .copied()
}

fn line_matches(line: &ShippingLine, wanted: &str) -> bool {
    let title = line.title.as_deref().unwrap_or("");
    match pattern_for(wanted) {
        Some((key, patterns)) => {
            let lower = title.to_lowercase();
            patterns.iter().any(|p| lower.contains(p))
                || (key == FREE_SHIPPING && line.price() == Some(Decimal::ZERO))
        }
        None => !title.is_empty() && same_text(title, wanted),
    }
}

pub struct DeliveryCriterion;

impl Criterion for DeliveryCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::Delivery
    }

    fn is_active(&self, config: &FilterConfig) -> bool {
        !selected(&config.delivery).is_empty()
    }

    fn fragment(&self, limits: &CompilerLimits) -> Vec<Selection> {
        let shipping_lines = Selection::node(
            "shippingLines",
            vec![Selection::node(
                "nodes",
                vec![
                    Selection::leaf("title"),
                    Selection::node(
                        "originalPriceSet",
                        vec![Selection::node(
                            "shopMoney",
                            vec![Selection::leaf("amount"), Selection::leaf("currencyCode")],
                        )],
                    ),
                ],
            )],
        )
        .with_args(format!("first: {}", limits.shipping_lines_per_order));
        vec![orders_fragment(limits, vec![shipping_lines])]
    }

    fn needs_order_data(&self) -> bool {
        true
    }

    fn cost(&self) -> u8 {
        3
    }

    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        let wanted = selected(&ctx.config.delivery);
        record
            .orders()
            .iter()
            .flat_map(|o| o.shipping_lines())
            .any(|line| wanted.iter().any(|w| line_matches(line, w)))
    }

    fn describe(&self, config: &FilterConfig) -> String {
        format!("Delivery: {}", selected(&config.delivery).join(", "))
    }
}
