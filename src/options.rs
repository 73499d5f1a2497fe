//! Picker catalogs for filter UIs

use crate::criteria::{delivery, location, payment, timing::TimingBucket};
use serde::Serialize;

/// Choices a filter UI can offer, per criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub regions: Vec<&'static str>,
    pub timing: Vec<&'static str>,
    pub payment: Vec<&'static str>,
    pub delivery: Vec<&'static str>,
}

pub fn filter_options() -> FilterOptions {
    FilterOptions {
        regions: location::region_names(),
        timing: TimingBucket::ALL.iter().map(|b| b.label()).collect(),
        payment: payment::OPTIONS.to_vec(),
        delivery: delivery::OPTIONS.to_vec(),
    }
}
