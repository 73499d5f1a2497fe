//! Shop Audience - filter-audience query compiler
//!
//! Turns a merchant's filter selections into one minimal Admin API fetch and
//! an AND-combined predicate pipeline over the fetched customers.
//!
//! ## Flow
//! Criteria -> Fragment Merger -> Paginated Fetcher -> Filter Pipeline -> Result Formatter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shop_audience::{filter_customers, FilterConfig, ShopifyAdminClient, ShopifyConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = ShopifyAdminClient::new(&ShopifyConfig::from_env()?)?;
//! let config = FilterConfig::new().with_location(["North America"]);
//! let outcome = filter_customers(&client, &config).await?;
//! println!("{} customers", outcome.total);
//! # Ok(())
//! # }
//! ```

// Error handling
pub mod error;

// Connection and sizing configuration
pub mod config;

// Upstream Admin API boundary
pub mod access;
pub mod client;

// One module per filter family, plus the registry
pub mod criteria;

// Fetch planning and execution
pub mod fetch_spec;
pub mod fetcher;
pub mod lookup;

// Filtering and output
pub mod format;
pub mod pipeline;

pub mod compiler;
pub mod options;

pub use audience_types::{
    AmountSpentFilter, CandidateRecord, FilterConfig, FilterOutcome, FilteredResult,
    SpendOperator,
};
pub use client::{AdminApiClient, GraphQlError, GraphQlRequest, GraphQlResponse, ShopifyAdminClient};
pub use compiler::{
    filter_customers, filter_customers_by_countries, filter_customers_with_limits,
    AudienceCompiler,
};
pub use config::{CompilerLimits, ShopifyConfig};
pub use criteria::{describe as describe_filters, Criterion, CriterionId, REGISTRY};
pub use error::{FilterError, ProtectedDomain, Result};
pub use fetch_spec::{build_fetch_spec, FetchSpec};
pub use fetcher::{fetch_candidates, FetchedCandidates, PageCursor};
pub use options::{filter_options, FilterOptions};
