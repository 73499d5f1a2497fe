//! AND-combined filter pipeline
//!
//! Each active criterion narrows what the previous stage kept. Stages run
//! cheapest first; the surviving set does not depend on the order.

use crate::criteria::{self, Criterion, MatchContext};
use audience_types::CandidateRecord;
use tracing::debug;

/// Run every active criterion of `ctx.config`, in evaluation order
pub fn apply_filters(records: Vec<CandidateRecord>, ctx: &MatchContext<'_>) -> Vec<CandidateRecord> {
    let stages = criteria::evaluation_order(ctx.config);
    apply_stages(records, &stages, ctx)
}

/// Run the given stages in the given order
pub fn apply_stages(
    mut records: Vec<CandidateRecord>,
    stages: &[&dyn Criterion],
    ctx: &MatchContext<'_>,
) -> Vec<CandidateRecord> {
    for stage in stages {
        if records.is_empty() {
            break;
        }
        let before = records.len();
        records.retain(|r| stage.matches(r, ctx));
        debug!(
            criterion = %stage.id(),
            before,
            after = records.len(),
            "Applied filter stage"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::ResolvedSelections;
    use audience_types::{Address, FilterConfig, Money, SpendOperator};

    fn customer(id: u32, country: &str, spent: &str) -> CandidateRecord {
        CandidateRecord {
            id: format!("gid://shopify/Customer/{}", id),
            amount_spent: Some(Money::new(spent, "USD")),
            default_address: Some(Address {
                country: Some(country.into()),
                country_code_v2: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_and_across_criteria() {
        let records = vec![
            customer(1, "Canada", "150.00"),
            customer(2, "Canada", "20.00"),
            customer(3, "Germany", "500.00"),
        ];
        let cfg = FilterConfig::new()
            .with_location(["Canada"])
            .with_amount_spent(100.0, SpendOperator::Min);
        let resolved = ResolvedSelections::default();
        let kept = apply_filters(records, &MatchContext::new(&cfg, &resolved));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "gid://shopify/Customer/1");
    }

    #[test]
    fn test_no_stages_keeps_everything() {
        let records = vec![customer(1, "Canada", "1.00")];
        let cfg = FilterConfig::new();
        let resolved = ResolvedSelections::default();
        assert_eq!(apply_filters(records, &MatchContext::new(&cfg, &resolved)).len(), 1);
    }
}
