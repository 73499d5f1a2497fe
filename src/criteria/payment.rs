//! Payment method criterion
//!
//! Gateway names are mapped to merchant-facing labels through a fixed alias
//! table. "Prepaid" and "Cash on Delivery" are derived from the order's
//! financial status instead.

use super::{same_text, Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::{orders_fragment, Selection};
use audience_types::{selected, CandidateRecord, FilterConfig, OrderSummary};

pub const PREPAID: &str = "Prepaid";
pub const CASH_ON_DELIVERY: &str = "Cash on Delivery";

/// gateway name (lowercase) -> label
pub static GATEWAY_ALIASES: &[(&str, &str)] = &[
    ("shopify_payments", "Credit Card"),
    ("stripe", "Credit Card"),
    ("authorize_net", "Credit Card"),
    ("braintree", "Credit Card"),
    ("paypal", "PayPal"),
    ("paypal_express", "PayPal"),
    ("shop_pay", "Shop Pay"),
    ("shopify_installments", "Shop Pay Installments"),
    ("apple_pay", "Apple Pay"),
    ("google_pay", "Google Pay"),
    ("amazon_payments", "Amazon Pay"),
    ("klarna", "Klarna"),
    ("afterpay", "Afterpay"),
    ("cash_on_delivery", CASH_ON_DELIVERY),
    ("cash on delivery (cod)", CASH_ON_DELIVERY),
    ("cod", CASH_ON_DELIVERY),
    ("manual", "Manual"),
    ("bank_deposit", "Bank Deposit"),
    ("gift_card", "Gift Card"),
    ("bogus", "Test Gateway"),
];

/// Labels offered by the payment picker
pub static OPTIONS: &[&str] = &[
    "Credit Card",
    "PayPal",
    "Shop Pay",
    "Apple Pay",
    "Google Pay",
    "Gift Card",
    "Bank Deposit",
    "Manual",
    PREPAID,
    CASH_ON_DELIVERY,
];

const COD_STATUSES: &[&str] = &["PENDING", "AUTHORIZED", "PARTIALLY_PAID"];
const PREPAID_STATUS: &str = "PAID";

/// Merchant-facing label for a gateway name, if the alias table knows it
pub fn gateway_label(gateway: &str) -> Option<&'static str> {
    let lower = gateway.trim().to_lowercase();
    let underscored = lower.replace(' ', "_");
    GATEWAY_ALIASES
        .iter()
        .find(|(key, _)| *key == lower || *key == underscored)
        .map(|(_, label)| *label)
}

fn status_is(order: &OrderSummary, statuses: &[&str]) -> bool {
    order
        .display_financial_status
        .as_deref()
        .map(|s| s.trim().to_ascii_uppercase())
        .is_some_and(|s| statuses.contains(&s.as_str()))
}

fn order_matches(order: &OrderSummary, wanted: &str) -> bool {
    if same_text(wanted, PREPAID) {
        return status_is(order, &[PREPAID_STATUS]);
    }
    let gateway_hit = order.payment_gateway_names.iter().any(|g| {
        same_text(g, wanted) || gateway_label(g).is_some_and(|label| same_text(label, wanted))
    });
    if gateway_hit {
        return true;
    }
    if same_text(wanted, CASH_ON_DELIVERY) || same_text(wanted, "cod") {
        return status_is(order, COD_STATUSES);
    }
    false
}

pub struct PaymentCriterion;

impl Criterion for PaymentCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::Payment
    }

    fn is_active(&self, config: &FilterConfig) -> bool {
        !selected(&config.payment).is_empty()
    }

    fn fragment(&self, limits: &CompilerLimits) -> Vec<Selection> {
        vec![orders_fragment(
            limits,
            vec![
                Selection::leaf("displayFinancialStatus"),
                Selection::leaf("paymentGatewayNames"),
            ],
        )]
    }

    fn needs_order_data(&self) -> bool {
        true
    }

    fn cost(&self) -> u8 {
        2
    }

    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        let wanted = selected(&ctx.config.payment);
        record
            .orders()
            .iter()
            .any(|o| wanted.iter().any(|w| order_matches(o, w)))
    }

    fn describe(&self, config: &FilterConfig) -> String {
        format!("Payment: {}", selected(&config.payment).join(", "))
    }
}
