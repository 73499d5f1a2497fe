//! Customer creation date criterion
//!
//! Day-granular: a customer created any time on the configured day matches.

use super::{Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::Selection;
use audience_types::{CandidateRecord, FilterConfig};

pub struct CreatedFromCriterion;

impl Criterion for CreatedFromCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::CustomerCreatedFrom
    }

    fn is_active(&self, config: &FilterConfig) -> bool {
        config.created_from_date().is_some()
    }

    fn fragment(&self, _limits: &CompilerLimits) -> Vec<Selection> {
        vec![Selection::leaf("createdAt")]
    }

    fn cost(&self) -> u8 {
        0
    }

    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        let Some(from) = ctx.config.created_from_date() else {
            return false;
        };
        record
            .created_at_utc()
            .is_some_and(|created| created.date_naive() >= from)
    }

    fn describe(&self, config: &FilterConfig) -> String {
        match config.created_from_date() {
            Some(day) => format!("Customer since {}", day.format("%Y-%m-%d")),
            None => "Customer since".to_string(),
        }
    }
}
