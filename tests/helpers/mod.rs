//! Scripted in-memory Admin API for integration tests
//!
//! Customer pages are served in order from a queue; title lookups answer from
//! a fixed table. Every request is recorded.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use shop_audience::{AdminApiClient, FilterError, GraphQlRequest, GraphQlResponse, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct ScriptedClient {
    pages: Mutex<VecDeque<Result<GraphQlResponse>>>,
    products_by_title: GraphQlResponse,
    collections_by_title: GraphQlResponse,
    requests: Mutex<Vec<GraphQlRequest>>,
}

impl ScriptedClient {
    pub fn new(pages: Vec<GraphQlResponse>) -> Self {
        Self::scripted(pages.into_iter().map(Ok).collect())
    }

    pub fn scripted(pages: Vec<Result<GraphQlResponse>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            products_by_title: GraphQlResponse::with_data(json!({"products": {"nodes": []}})),
            collections_by_title: GraphQlResponse::with_data(json!({"collections": {"nodes": []}})),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// One final page holding `nodes`
    pub fn single_page(nodes: Vec<Value>) -> Self {
        Self::new(vec![customers_page(nodes, None)])
    }

    pub fn with_product_lookup(mut self, response: GraphQlResponse) -> Self {
        self.products_by_title = response;
        self
    }

    pub fn with_collection_lookup(mut self, response: GraphQlResponse) -> Self {
        self.collections_by_title = response;
        self
    }

    pub fn requests(&self) -> Vec<GraphQlRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn customer_requests(&self) -> Vec<GraphQlRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.query.contains("customers("))
            .collect()
    }
}

#[async_trait]
impl AdminApiClient for ScriptedClient {
    async fn query(&self, request: &GraphQlRequest) -> Result<GraphQlResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if request.query.contains("ProductsByTitle") {
            return Ok(self.products_by_title.clone());
        }
        if request.query.contains("CollectionsByTitle") {
            return Ok(self.collections_by_title.clone());
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FilterError::http("script exhausted")))
    }
}

pub fn customers_page(nodes: Vec<Value>, next: Option<&str>) -> GraphQlResponse {
    GraphQlResponse::with_data(json!({
        "customers": {
            "pageInfo": {"hasNextPage": next.is_some(), "endCursor": next},
            "nodes": nodes
        }
    }))
}

pub fn customer(id: u32) -> Value {
    json!({
        "id": format!("gid://shopify/Customer/{}", id),
        "displayName": format!("Customer {}", id),
        "email": format!("c{}@example.com", id),
        "createdAt": "2024-01-15T12:00:00Z",
        "numberOfOrders": "2",
        "amountSpent": {"amount": "42.5", "currencyCode": "USD"},
        "defaultAddress": {"country": "Canada", "countryCodeV2": "CA"}
    })
}

/// `customer(id)` with `patch` merged over its top-level fields
pub fn customer_with(id: u32, patch: Value) -> Value {
    let mut node = customer(id);
    if let (Some(target), Value::Object(fields)) = (node.as_object_mut(), patch) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
    node
}

pub fn ids(outcome: &shop_audience::FilterOutcome) -> Vec<String> {
    outcome.customers.iter().map(|c| c.id.clone()).collect()
}
