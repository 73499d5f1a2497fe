//! Lifetime spend criterion

use super::{Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::Selection;
use audience_types::{CandidateRecord, FilterConfig, SpendOperator};

pub struct AmountSpentCriterion;

impl Criterion for AmountSpentCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::AmountSpent
    }

    fn is_active(&self, config: &FilterConfig) -> bool {
        config.spend_threshold().is_some()
    }

    fn fragment(&self, _limits: &CompilerLimits) -> Vec<Selection> {
        vec![Selection::node(
            "amountSpent",
            vec![Selection::leaf("amount"), Selection::leaf("currencyCode")],
        )]
    }

    fn cost(&self) -> u8 {
        0
    }

    /// Missing spend counts as zero
    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        ctx.config
            .spend_threshold()
            .is_some_and(|t| t.admits(record.spend()))
    }

    fn describe(&self, config: &FilterConfig) -> String {
        match config.spend_threshold() {
            Some(t) => {
                let op = match t.operator {
                    SpendOperator::Min => ">=",
                    SpendOperator::Max => "<=",
                };
                format!("Amount spent {} {}", op, t.amount.normalize())
            }
            None => "Amount spent".to_string(),
        }
    }
}
