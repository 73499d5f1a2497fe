//! Purchase timing criterion
//!
//! Buckets an order's creation time (UTC) by time of day and by day of week.
//! A customer matches when any recent order falls in any configured bucket.

use super::{Criterion, CriterionId, MatchContext};
use crate::config::CompilerLimits;
use crate::fetch_spec::{orders_fragment, Selection};
use audience_types::{selected, CandidateRecord, FilterConfig};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// 06:00-12:00
    Morning,
    /// 12:00-18:00
    Afternoon,
    /// 18:00-24:00
    Evening,
    /// 00:00-06:00
    Night,
    /// Monday-Friday
    Weekday,
    /// Saturday, Sunday
    Weekend,
}

impl TimingBucket {
    pub const ALL: [TimingBucket; 6] = [
        Self::Morning,
        Self::Afternoon,
        Self::Evening,
        Self::Night,
        Self::Weekday,
        Self::Weekend,
    ];

    /// Accepts bare keywords and picker labels ("Morning (6AM-12PM)")
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        // day words first: "weekday mornings" is a day bucket
        if lower.contains("weekend") {
            Some(Self::Weekend)
        } else if lower.contains("weekday") {
            Some(Self::Weekday)
        } else if lower.contains("morning") {
            Some(Self::Morning)
        } else if lower.contains("afternoon") {
            Some(Self::Afternoon)
        } else if lower.contains("evening") {
            Some(Self::Evening)
        } else if lower.contains("night") {
            Some(Self::Night)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Morning (6AM-12PM)",
            Self::Afternoon => "Afternoon (12PM-6PM)",
            Self::Evening => "Evening (6PM-12AM)",
            Self::Night => "Night (12AM-6AM)",
            Self::Weekday => "Weekdays",
            Self::Weekend => "Weekends",
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let hour = at.hour();
        match self {
            Self::Morning => (6..12).contains(&hour),
            Self::Afternoon => (12..18).contains(&hour),
            Self::Evening => (18..24).contains(&hour),
            Self::Night => hour < 6,
            Self::Weekday => !matches!(at.weekday(), Weekday::Sat | Weekday::Sun),
            Self::Weekend => matches!(at.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

fn configured_buckets(config: &FilterConfig) -> Vec<TimingBucket> {
    let mut buckets: Vec<TimingBucket> = selected(&config.timing)
        .into_iter()
        .filter_map(TimingBucket::from_label)
        .collect();
    buckets.dedup();
    buckets
}

pub struct TimingCriterion;

impl Criterion for TimingCriterion {
    fn id(&self) -> CriterionId {
        CriterionId::Timing
    }

    /// Only labels that name a bucket count
    fn is_active(&self, config: &FilterConfig) -> bool {
        !configured_buckets(config).is_empty()
    }

    fn fragment(&self, limits: &CompilerLimits) -> Vec<Selection> {
        vec![orders_fragment(limits, vec![Selection::leaf("createdAt")])]
    }

    fn needs_order_data(&self) -> bool {
        true
    }

    fn cost(&self) -> u8 {
        2
    }

    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool {
        let buckets = configured_buckets(ctx.config);
        record
            .orders()
            .iter()
            .filter_map(|o| o.created_at_utc())
            .any(|at| buckets.iter().any(|b| b.contains(at)))
    }

    fn describe(&self, config: &FilterConfig) -> String {
        let labels: Vec<&str> = configured_buckets(config).iter().map(|b| b.label()).collect();
        format!("Purchase timing: {}", labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::ResolvedSelections;
    use audience_types::{Connection, OrderSummary};

    fn ordered_at(stamps: &[&str]) -> CandidateRecord {
        CandidateRecord {
            id: "gid://shopify/Customer/1".into(),
            orders: Some(Connection::from(
                stamps
                    .iter()
                    .map(|s| OrderSummary {
                        created_at: Some(s.to_string()),
                        ..Default::default()
                    })
                    .collect::<Vec<_>>(),
            )),
            ..Default::default()
        }
    }

    fn check(record: &CandidateRecord, labels: &[&str]) -> bool {
        let cfg = FilterConfig::new().with_timing(labels.iter().copied());
        let resolved = ResolvedSelections::default();
        TimingCriterion.matches(record, &MatchContext::new(&cfg, &resolved))
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_time_of_day_boundaries() {
        assert!(TimingBucket::Night.contains(at("2024-06-03T05:59:59Z")));
        assert!(TimingBucket::Morning.contains(at("2024-06-03T06:00:00Z")));
        assert!(TimingBucket::Afternoon.contains(at("2024-06-03T12:00:00Z")));
        assert!(TimingBucket::Evening.contains(at("2024-06-03T23:59:59Z")));
        assert!(TimingBucket::Night.contains(at("2024-06-04T00:00:00Z")));
    }

    #[test]
    fn test_time_of_day_buckets_are_exclusive() {
        let moment = at("2024-06-03T14:30:00Z");
        let hits = [
            TimingBucket::Morning,
            TimingBucket::Afternoon,
            TimingBucket::Evening,
            TimingBucket::Night,
        ]
        .iter()
        .filter(|b| b.contains(moment))
        .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_bucket_uses_utc() {
        // 23:30 at -02:00 is 01:30 UTC the next day (a Sunday)
        let record = ordered_at(&["2024-06-01T23:30:00-02:00"]);
        assert!(check(&record, &["Night"]));
        assert!(!check(&record, &["Evening"]));
        assert!(check(&record, &["Weekends"]));
    }

    #[test]
    fn test_any_order_suffices() {
        // Monday morning, Saturday evening
        let record = ordered_at(&["2024-06-03T08:00:00Z", "2024-06-08T20:00:00Z"]);
        assert!(check(&record, &["Evening (6PM-12AM)"]));
        assert!(check(&record, &["Weekday"]));
        assert!(!check(&record, &["Afternoon"]));
    }

    #[test]
    fn test_unknown_labels_are_inactive() {
        let cfg = FilterConfig::new().with_timing(["lunchtime"]);
        assert!(!TimingCriterion.is_active(&cfg));
        let cfg = FilterConfig::new().with_timing(["lunchtime", "Morning"]);
        assert!(TimingCriterion.is_active(&cfg));
    }

    #[test]
    fn test_from_label() {
        for bucket in TimingBucket::ALL {
            assert_eq!(TimingBucket::from_label(bucket.label()), Some(bucket));
        }
    }
}
