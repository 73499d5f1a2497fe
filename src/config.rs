//! Configuration for the Admin API connection and compiler limits
//!
//! Loaded once from environment variables; the CLI calls `dotenvy` first so a
//! local `.env` works too.

use anyhow::{anyhow, Context, Result};

const DEFAULT_API_VERSION: &str = "2024-10";

/// Connection settings for one shop's Admin GraphQL API
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// `my-store.myshopify.com`
    pub shop_domain: String,
    pub access_token: String,
    pub api_version: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Minimum spacing between two requests
    pub min_request_interval_ms: u64,
}

impl ShopifyConfig {
    pub fn new(shop_domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_seconds: 30,
            min_request_interval_ms: 250,
        }
    }

    pub fn from_env() -> Result<Self> {
        let shop_domain = std::env::var("SHOPIFY_SHOP_DOMAIN")
            .context("SHOPIFY_SHOP_DOMAIN environment variable not set")?;
        let access_token = std::env::var("SHOPIFY_ACCESS_TOKEN")
            .context("SHOPIFY_ACCESS_TOKEN environment variable not set")?;

        let mut config = Self::new(shop_domain, access_token);
        if let Ok(version) = std::env::var("SHOPIFY_API_VERSION") {
            config.api_version = version;
        }
        config.timeout_seconds = env_u64("SHOPIFY_TIMEOUT_SECS", config.timeout_seconds)?;
        config.min_request_interval_ms = env_u64(
            "SHOPIFY_MIN_REQUEST_INTERVAL_MS",
            config.min_request_interval_ms,
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(anyhow!("Shopify access token is empty"));
        }
        self.endpoint().map(|_| ())
    }

    /// `https://{shop}/admin/api/{version}/graphql.json`
    pub fn endpoint(&self) -> Result<url::Url> {
        let domain = self
            .shop_domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        if domain.is_empty() {
            return Err(anyhow!("Shopify shop domain is empty"));
        }
        let raw = format!(
            "https://{}/admin/api/{}/graphql.json",
            domain, self.api_version
        );
        url::Url::parse(&raw).with_context(|| format!("Invalid shop endpoint {}", raw))
    }
}

/// Sizing knobs for one compilation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerLimits {
    /// Page size when only scalar customer fields are selected
    pub default_batch_size: usize,
    /// Page size when nested order data is selected
    pub reduced_batch_size: usize,
    /// Hard cap on records fetched per run
    pub record_cap: usize,
    /// Upper bound on recent orders selected per customer; the fetch plan
    /// lowers it to fit `max_query_cost`
    pub orders_per_customer: usize,
    /// Line items selected per order
    pub line_items_per_order: usize,
    /// Shipping lines selected per order
    pub shipping_lines_per_order: usize,
    /// Admin API ceiling on the requested cost of a single query
    pub max_query_cost: usize,
}

impl Default for CompilerLimits {
    fn default() -> Self {
        Self {
            default_batch_size: 250,
            reduced_batch_size: 50,
            record_cap: 1000,
            orders_per_customer: 10,
            line_items_per_order: 3,
            shipping_lines_per_order: 1,
            max_query_cost: 1000,
        }
    }
}

impl CompilerLimits {
    /// Defaults overridden by `AUDIENCE_*` variables
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            default_batch_size: env_usize("AUDIENCE_DEFAULT_BATCH_SIZE", d.default_batch_size)?,
            reduced_batch_size: env_usize("AUDIENCE_REDUCED_BATCH_SIZE", d.reduced_batch_size)?,
            record_cap: env_usize("AUDIENCE_RECORD_CAP", d.record_cap)?,
            orders_per_customer: env_usize("AUDIENCE_ORDERS_PER_CUSTOMER", d.orders_per_customer)?,
            line_items_per_order: env_usize(
                "AUDIENCE_LINE_ITEMS_PER_ORDER",
                d.line_items_per_order,
            )?,
            shipping_lines_per_order: env_usize(
                "AUDIENCE_SHIPPING_LINES_PER_ORDER",
                d.shipping_lines_per_order,
            )?,
            max_query_cost: env_usize("AUDIENCE_MAX_QUERY_COST", d.max_query_cost)?,
        })
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be an unsigned integer, got {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    let value = env_u64(key, default as u64)?;
    if value == 0 {
        return Err(anyhow!("{} must be greater than zero", key));
    }
    Ok(value as usize)
}
