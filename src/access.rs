//! Protected-data access classification
//!
//! The Admin API reports missing protected-data approval as free text. All
//! matching on that text lives here, one rule per domain, so it can be swapped
//! out wholesale once a structured error code is reliably available.
//! `extensions.code == "ACCESS_DENIED"` is already honoured when present.

use crate::client::{GraphQlError, GraphQlResponse};
use crate::error::{FilterError, ProtectedDomain, Result};

const ACCESS_DENIED_CODE: &str = "ACCESS_DENIED";

const DENIAL_PHRASES: &[&str] = &["not approved", "protected", "access denied"];

fn mentions_denial(lower: &str) -> bool {
    DENIAL_PHRASES.iter().any(|p| lower.contains(p))
}

/// Customer-data denial: a denial phrase together with "customer"
pub fn is_customer_denial(message: &str) -> bool {
    let lower = message.to_lowercase();
    mentions_denial(&lower) && lower.contains("customer")
}

/// Order-data denial: a denial phrase together with "order"
pub fn is_order_denial(message: &str) -> bool {
    let lower = message.to_lowercase();
    mentions_denial(&lower) && lower.contains("order")
}

/// Classify free text; customer data wins when both entities are named
pub fn classify_message(message: &str) -> Option<ProtectedDomain> {
    if is_customer_denial(message) {
        Some(ProtectedDomain::CustomerData)
    } else if is_order_denial(message) {
        Some(ProtectedDomain::OrderData)
    } else {
        None
    }
}

pub fn classify_error(error: &GraphQlError) -> Option<ProtectedDomain> {
    if let Some(domain) = classify_message(&error.message) {
        return Some(domain);
    }
    if error.code() == Some(ACCESS_DENIED_CODE) {
        let lower = error.message.to_lowercase();
        return Some(if lower.contains("order") && !lower.contains("customer") {
            ProtectedDomain::OrderData
        } else {
            ProtectedDomain::CustomerData
        });
    }
    None
}

/// Turn a response's error payload into the matching failure.
///
/// Any access denial wins over other errors in the same payload; otherwise
/// the first reported message is surfaced.
pub fn check_response(response: &GraphQlResponse) -> Result<()> {
    let errors = response.errors();
    if let Some((domain, error)) = errors
        .iter()
        .find_map(|e| classify_error(e).map(|d| (d, e)))
    {
        return Err(FilterError::access_denied(domain, error.message.clone()));
    }
    match errors.first() {
        Some(first) => Err(FilterError::UpstreamQuery(first.message.clone())),
        None => Ok(()),
    }
}
