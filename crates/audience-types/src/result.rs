//! Caller-facing result shapes

use serde::{Deserialize, Serialize};

/// One surviving customer, display-ready
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredResult {
    pub id: String,
    pub name: String,
    pub email: String,
    pub country: String,
    pub created_at: String,
    pub orders_count: u64,
    pub total_spent: String,
}

/// Outcome of one audience compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub customers: Vec<FilteredResult>,
    pub total: usize,
    /// Pagination stopped at the record cap; the segment may be undercounted
    #[serde(default)]
    pub truncated: bool,
}

impl FilterOutcome {
    /// "Nothing was asked for"
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(customers: Vec<FilteredResult>, truncated: bool) -> Self {
        Self {
            total: customers.len(),
            customers,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_shape() {
        let json = serde_json::to_value(FilterOutcome::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"customers": [], "total": 0, "truncated": false})
        );
    }
}
