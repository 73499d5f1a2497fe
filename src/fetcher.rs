//! Paginated candidate fetch
//!
//! [`PageCursor`] pulls one `customers` page per call and stops on its own
//! once the upstream runs dry or the record cap is reached. Nothing is
//! fetched ahead of the caller.

use crate::access;
use crate::client::{AdminApiClient, GraphQlRequest};
use crate::error::{FilterError, Result};
use crate::fetch_spec::FetchSpec;
use audience_types::CandidateRecord;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomersPage {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<CandidateRecord>,
}

#[derive(Debug, Deserialize)]
struct CustomersData {
    customers: Option<CustomersPage>,
}

/// Lazy, bounded cursor over `customers` pages
pub struct PageCursor<'a, C: ?Sized> {
    client: &'a C,
    query: String,
    batch_size: usize,
    cap: usize,
    after: Option<String>,
    fetched: usize,
    pages: usize,
    exhausted: bool,
    truncated: bool,
}

impl<'a, C> PageCursor<'a, C>
where
    C: AdminApiClient + ?Sized,
{
    pub fn new(client: &'a C, spec: &FetchSpec, cap: usize) -> Self {
        Self {
            client,
            query: spec.render_query(),
            batch_size: spec.batch_size.max(1),
            cap,
            after: None,
            fetched: 0,
            pages: 0,
            exhausted: cap == 0,
            truncated: false,
        }
    }

    /// Records handed out so far
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// True once the cap cut pagination short
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Fetch the next page, or `None` when done.
    ///
    /// Any error payload aborts: access denials as `AccessDenied`, the rest
    /// as `UpstreamQuery`. No retries.
    pub async fn next_page(&mut self) -> Result<Option<Vec<CandidateRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let remaining = self.cap - self.fetched;
        let first = self.batch_size.min(remaining);
        let request = GraphQlRequest::new(
            self.query.clone(),
            json!({ "first": first, "after": self.after }),
        );

        let response = self.client.query(&request).await?;
        access::check_response(&response)?;

        let data = response
            .data
            .ok_or_else(|| FilterError::invalid_response("customers page carried no data"))?;
        let page = serde_json::from_value::<CustomersData>(data)?
            .customers
            .ok_or_else(|| FilterError::invalid_response("customers page missing `customers`"))?;

        self.pages += 1;
        let mut records = page.nodes;
        if records.len() > remaining {
            records.truncate(remaining);
            self.truncated = true;
        }
        self.fetched += records.len();

        let has_next = page.page_info.has_next_page;
        debug!(
            page = self.pages,
            records = records.len(),
            fetched = self.fetched,
            has_next,
            "Fetched customers page"
        );

        if records.is_empty() || !has_next {
            self.exhausted = true;
        } else if self.fetched >= self.cap {
            self.exhausted = true;
            self.truncated = true;
        } else {
            match page.page_info.end_cursor {
                Some(cursor) => self.after = Some(cursor),
                None => {
                    warn!(page = self.pages, "Next page advertised without a cursor, stopping");
                    self.exhausted = true;
                }
            }
        }

        if self.truncated && self.exhausted {
            warn!(cap = self.cap, "Record cap reached, remaining customers not fetched");
        }

        Ok(Some(records))
    }
}

/// Everything a cursor produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedCandidates {
    pub records: Vec<CandidateRecord>,
    pub truncated: bool,
    pub pages: usize,
}

/// Drain a [`PageCursor`] into memory
pub async fn fetch_candidates<C>(client: &C, spec: &FetchSpec, cap: usize) -> Result<FetchedCandidates>
where
    C: AdminApiClient + ?Sized,
{
    let mut cursor = PageCursor::new(client, spec, cap);
    let mut records = Vec::new();
    while let Some(page) = cursor.next_page().await? {
        records.extend(page);
    }
    Ok(FetchedCandidates {
        records,
        truncated: cursor.truncated(),
        pages: cursor.pages(),
    })
}
