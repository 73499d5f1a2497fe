//! Admin API client boundary
//!
//! The compiler only ever talks to the upstream store through
//! [`AdminApiClient::query`]. `ShopifyAdminClient` is the HTTP implementation;
//! tests script their own.

pub mod shopify;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use shopify::ShopifyAdminClient;

/// A GraphQL document plus its variables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>, variables: serde_json::Value) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// `{data, errors}` envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    pub fn with_data(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    pub fn with_errors(messages: &[&str]) -> Self {
        Self {
            data: None,
            errors: Some(messages.iter().map(|m| GraphQlError::new(*m)).collect()),
        }
    }

    pub fn errors(&self) -> &[GraphQlError] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    /// `extensions.code`, when the API supplies one
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

/// The one upstream capability the compiler depends on
#[async_trait]
pub trait AdminApiClient: Send + Sync {
    /// Run one GraphQL request.
    ///
    /// Transport failures are `Err`; GraphQL-level errors come back inside
    /// the response for the caller to classify.
    async fn query(&self, request: &GraphQlRequest) -> Result<GraphQlResponse>;
}
