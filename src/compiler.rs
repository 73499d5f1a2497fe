//! Audience compilation entry points
//!
//! One run: work out the active criteria, fetch every field they need in a
//! single paginated query, resolve product titles, narrow the candidates
//! through the pipeline and format what survives.

use crate::client::AdminApiClient;
use crate::config::CompilerLimits;
use crate::criteria::{self, Criterion, MatchContext, ResolvedSelections};
use crate::error::Result;
use crate::fetch_spec::build_fetch_spec;
use crate::fetcher::fetch_candidates;
use crate::format::format_record;
use crate::lookup::resolve_product_selection;
use crate::pipeline::apply_filters;
use audience_types::{selected, FilterConfig, FilterOutcome};
use tracing::info;

/// A client plus the limits every run uses
pub struct AudienceCompiler<C> {
    client: C,
    limits: CompilerLimits,
}

impl<C> AudienceCompiler<C>
where
    C: AdminApiClient,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            limits: CompilerLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CompilerLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn limits(&self) -> &CompilerLimits {
        &self.limits
    }

    pub async fn filter(&self, config: &FilterConfig) -> Result<FilterOutcome> {
        filter_customers_with_limits(&self.client, config, &self.limits).await
    }

    pub async fn filter_by_countries(&self, countries: &[String]) -> Result<FilterOutcome> {
        self.filter(&countries_config(countries)).await
    }
}

/// Compile and run an audience with default limits
pub async fn filter_customers<C>(client: &C, config: &FilterConfig) -> Result<FilterOutcome>
where
    C: AdminApiClient + ?Sized,
{
    filter_customers_with_limits(client, config, &CompilerLimits::default()).await
}

/// Compile and run an audience.
///
/// No active criteria returns an empty outcome without touching the client.
/// `AccessDenied` from any request aborts the whole run; there is no partial
/// result.
pub async fn filter_customers_with_limits<C>(
    client: &C,
    config: &FilterConfig,
    limits: &CompilerLimits,
) -> Result<FilterOutcome>
where
    C: AdminApiClient + ?Sized,
{
    if !criteria::has_active(config) {
        info!("No active filters, skipping fetch");
        return Ok(FilterOutcome::empty());
    }

    let spec = build_fetch_spec(config, limits);
    info!(
        criteria = ?spec.active,
        batch_size = spec.batch_size,
        requested_cost = spec.requested_cost(),
        limits = ?limits,
        summary = %criteria::describe(config),
        "Compiling audience"
    );

    let fetched = fetch_candidates(client, &spec, limits.record_cap).await?;

    let resolved = if criteria::products::ProductsCriterion.is_active(config) {
        resolve_product_selection(client, &config.products).await?
    } else {
        ResolvedSelections::default()
    };

    let candidates = fetched.records.len();
    let ctx = MatchContext::new(config, &resolved);
    let kept = apply_filters(fetched.records, &ctx);
    let customers: Vec<_> = kept.iter().map(format_record).collect();

    info!(
        pages = fetched.pages,
        candidates,
        matched = customers.len(),
        truncated = fetched.truncated,
        "Audience compiled"
    );

    Ok(FilterOutcome::new(customers, fetched.truncated))
}

/// Country-only audience, kept for callers of the old location search
pub async fn filter_customers_by_countries<C>(client: &C, countries: &[String]) -> Result<FilterOutcome>
where
    C: AdminApiClient + ?Sized,
{
    filter_customers(client, &countries_config(countries)).await
}

fn countries_config(countries: &[String]) -> FilterConfig {
    FilterConfig::new().with_location(selected(countries))
}
