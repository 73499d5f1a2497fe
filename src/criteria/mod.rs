//! Criterion registry
//!
//! Every filter family implements [`Criterion`] and is listed once in
//! [`REGISTRY`]. The fragment merger, the filter pipeline and the
//! description helper all go through the registry.

pub mod amount_spent;
pub mod created_from;
pub mod delivery;
pub mod location;
pub mod payment;
pub mod products;
pub mod timing;

use crate::config::CompilerLimits;
use crate::fetch_spec::Selection;
use audience_types::{CandidateRecord, FilterConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Filter families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriterionId {
    Location,
    Products,
    Timing,
    Payment,
    Delivery,
    AmountSpent,
    CustomerCreatedFrom,
}

impl CriterionId {
    pub const ALL: [CriterionId; 7] = [
        Self::Location,
        Self::Products,
        Self::Timing,
        Self::Payment,
        Self::Delivery,
        Self::AmountSpent,
        Self::CustomerCreatedFrom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Products => "products",
            Self::Timing => "timing",
            Self::Payment => "payment",
            Self::Delivery => "delivery",
            Self::AmountSpent => "amountSpent",
            Self::CustomerCreatedFrom => "customerCreatedFrom",
        }
    }
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookups resolved before filtering (product/collection titles to ids)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSelections {
    pub product_ids: HashSet<String>,
}

/// Everything a predicate may look at besides the record itself
///
/// Built once per run; per-run derivations of the config live here so
/// predicates never recompute them per record.
#[derive(Debug, Clone)]
pub struct MatchContext<'a> {
    pub config: &'a FilterConfig,
    pub resolved: &'a ResolvedSelections,
    /// `config.location` with regions expanded to member countries
    pub locations: Vec<String>,
}

impl<'a> MatchContext<'a> {
    pub fn new(config: &'a FilterConfig, resolved: &'a ResolvedSelections) -> Self {
        Self {
            config,
            resolved,
            locations: location::normalize_locations(&config.location),
        }
    }
}

/// One filter family: what it fetches and how it matches
pub trait Criterion: Send + Sync {
    fn id(&self) -> CriterionId;

    /// Absent, empty or malformed configuration means inactive
    fn is_active(&self, config: &FilterConfig) -> bool;

    /// Fields this criterion needs on each customer node
    fn fragment(&self, limits: &CompilerLimits) -> Vec<Selection>;

    /// Whether the fragment reaches into nested orders
    fn needs_order_data(&self) -> bool {
        false
    }

    /// Relative evaluation cost; cheaper stages run first
    fn cost(&self) -> u8;

    /// Only called when `is_active` holds for `ctx.config`
    fn matches(&self, record: &CandidateRecord, ctx: &MatchContext<'_>) -> bool;

    /// Short human-readable summary of the active selection
    fn describe(&self, config: &FilterConfig) -> String;
}

pub static REGISTRY: &[&dyn Criterion] = &[
    &location::LocationCriterion,
    &products::ProductsCriterion,
    &timing::TimingCriterion,
    &payment::PaymentCriterion,
    &delivery::DeliveryCriterion,
    &amount_spent::AmountSpentCriterion,
    &created_from::CreatedFromCriterion,
];

pub fn lookup(id: CriterionId) -> &'static dyn Criterion {
    match id {
        CriterionId::Location => &location::LocationCriterion,
        CriterionId::Products => &products::ProductsCriterion,
        CriterionId::Timing => &timing::TimingCriterion,
        CriterionId::Payment => &payment::PaymentCriterion,
        CriterionId::Delivery => &delivery::DeliveryCriterion,
        CriterionId::AmountSpent => &amount_spent::AmountSpentCriterion,
        CriterionId::CustomerCreatedFrom => &created_from::CreatedFromCriterion,
    }
}

/// Active criteria in registry order
pub fn active(config: &FilterConfig) -> Vec<&'static dyn Criterion> {
    REGISTRY
        .iter()
        .copied()
        .filter(|c| c.is_active(config))
        .collect()
}

/// Active criteria in evaluation order (cheapest first, registry order on ties)
pub fn evaluation_order(config: &FilterConfig) -> Vec<&'static dyn Criterion> {
    let mut stages = active(config);
    stages.sort_by_key(|c| c.cost());
    stages
}

pub fn has_active(config: &FilterConfig) -> bool {
    REGISTRY.iter().any(|c| c.is_active(config))
}

/// "Location: Canada AND Amount spent >= 100", or "No filters"
pub fn describe(config: &FilterConfig) -> String {
    let parts: Vec<String> = active(config)
        .iter()
        .map(|c| c.describe(config))
        .collect();
    if parts.is_empty() {
        "No filters".to_string()
    } else {
        parts.join(" AND ")
    }
}

/// Case-insensitive, whitespace-trimmed text equality
pub(crate) fn same_text(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}
