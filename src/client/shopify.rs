//! Shopify Admin GraphQL client
//!
//! Request-spaced HTTP client for one shop's Admin API.

use super::{AdminApiClient, GraphQlRequest, GraphQlResponse};
use crate::access;
use crate::config::ShopifyConfig;
use crate::error::{FilterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Admin API client for a single shop
pub struct ShopifyAdminClient {
    http: Client,
    endpoint: url::Url,
    access_token: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl ShopifyAdminClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let endpoint = config
            .endpoint()
            .map_err(|e| FilterError::Configuration(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FilterError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
            min_interval: Duration::from_millis(config.min_request_interval_ms),
            last_request: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Enforce the minimum spacing between requests
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl AdminApiClient for ShopifyAdminClient {
    async fn query(&self, request: &GraphQlRequest) -> Result<GraphQlResponse> {
        self.rate_limit().await;

        debug!(endpoint = %self.endpoint, "Sending Admin API request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(%status, "Admin API request failed");
            if let Some(domain) = access::classify_message(&body) {
                return Err(FilterError::access_denied(domain, truncate(&body)));
            }
            return Err(FilterError::http(format!(
                "Admin API error {}: {}",
                status,
                truncate(&body)
            )));
        }

        let parsed: GraphQlResponse = serde_json::from_str(&body).map_err(|e| {
            FilterError::invalid_response(format!(
                "Failed to parse Admin API response: {}. First 200 chars: {}",
                e,
                truncate(&body)
            ))
        })?;

        Ok(parsed)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
