//! Product selection lookup
//!
//! Merchants pick products and collections by title. Titles are resolved to
//! product ids up front, one value at a time, so the products predicate can
//! test id membership as well as title and type.

use crate::access;
use crate::client::{AdminApiClient, GraphQlRequest};
use crate::criteria::products::is_product_gid;
use crate::criteria::ResolvedSelections;
use crate::error::{FilterError, Result};
use audience_types::{selected, Connection};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, warn};

const PRODUCTS_BY_TITLE: &str = "query ProductsByTitle($query: String!) {
  products(first: 50, query: $query) {
    nodes {
      id
    }
  }
}
";

const COLLECTIONS_BY_TITLE: &str = "query CollectionsByTitle($query: String!) {
  collections(first: 10, query: $query) {
    nodes {
      id
      products(first: 250) {
        nodes {
          id
        }
      }
    }
  }
}
";

#[derive(Debug, Deserialize)]
struct IdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Option<Connection<IdNode>>,
}

#[derive(Debug, Deserialize)]
struct CollectionNode {
    #[serde(default)]
    products: Option<Connection<IdNode>>,
}

#[derive(Debug, Deserialize)]
struct CollectionsData {
    collections: Option<Connection<CollectionNode>>,
}

/// `title:"..."` search syntax with quotes and backslashes escaped
pub fn title_search(title: &str) -> String {
    let escaped = title.trim().replace('\\', "\\\\").replace('"', "\\\"");
    format!("title:\"{}\"", escaped)
}

async fn run<C, T>(client: &C, query: &str, title: &str) -> Result<Option<T>>
where
    C: AdminApiClient + ?Sized,
    T: for<'de> Deserialize<'de>,
{
    let request = GraphQlRequest::new(query, json!({ "query": title_search(title) }));
    let response = client.query(&request).await?;
    access::check_response(&response)?;
    match response.data {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}

async fn products_titled<C>(client: &C, title: &str) -> Result<Vec<String>>
where
    C: AdminApiClient + ?Sized,
{
    let data: Option<ProductsData> = run(client, PRODUCTS_BY_TITLE, title).await?;
    Ok(data
        .and_then(|d| d.products)
        .map(|c| c.nodes.into_iter().map(|n| n.id).collect())
        .unwrap_or_default())
}

async fn collection_members<C>(client: &C, title: &str) -> Result<Vec<String>>
where
    C: AdminApiClient + ?Sized,
{
    let data: Option<CollectionsData> = run(client, COLLECTIONS_BY_TITLE, title).await?;
    Ok(data
        .and_then(|d| d.collections)
        .map(|c| {
            c.nodes
                .into_iter()
                .flat_map(|col| col.products.unwrap_or_default().nodes)
                .map(|n| n.id)
                .collect()
        })
        .unwrap_or_default())
}

/// Keep going on generic failures, stop on access denial
fn soften(value: &str, kind: &str, result: Result<Vec<String>>) -> Result<Vec<String>> {
    match result {
        Ok(ids) => Ok(ids),
        Err(e @ FilterError::AccessDenied { .. }) => Err(e),
        Err(e) => {
            warn!(value = %value, lookup = kind, error = %e, "Product lookup failed, continuing without it");
            Ok(Vec::new())
        }
    }
}

/// Resolve configured product selections to product ids.
///
/// Values that already are product GIDs are taken as-is. Everything else is
/// looked up as a product title and as a collection title. Lookups run
/// sequentially; an access denial aborts, any other failure leaves that
/// value unresolved.
pub async fn resolve_product_selection<C>(client: &C, values: &[String]) -> Result<ResolvedSelections>
where
    C: AdminApiClient + ?Sized,
{
    let mut product_ids = HashSet::new();

    for value in selected(values) {
        if is_product_gid(value) {
            product_ids.insert(value.to_string());
            continue;
        }

        let products = soften(value, "product", products_titled(client, value).await)?;
        let members = soften(value, "collection", collection_members(client, value).await)?;
        debug!(
            value = %value,
            products = products.len(),
            collection_members = members.len(),
            "Resolved product selection"
        );
        product_ids.extend(products);
        product_ids.extend(members);
    }

    Ok(ResolvedSelections { product_ids })
}
