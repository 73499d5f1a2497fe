//! Error types for the audience filter
//!
//! `AccessDenied` is kept apart from every other failure: callers render a
//! "request protected data access" prompt for it instead of a generic error
//! banner, so it must never be folded into another variant.

use thiserror::Error;

/// Protected data categories gated behind merchant-approved API access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectedDomain {
    CustomerData,
    OrderData,
}

impl std::fmt::Display for ProtectedDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomerData => write!(f, "customer-data"),
            Self::OrderData => write!(f, "order-data"),
        }
    }
}

/// Errors raised while compiling and running an audience filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Protected {domain} access has not been approved for this app: {message}")]
    AccessDenied {
        domain: ProtectedDomain,
        message: String,
    },

    #[error("Upstream query error: {0}")]
    UpstreamQuery(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FilterError {
    pub fn access_denied(domain: ProtectedDomain, message: impl Into<String>) -> Self {
        Self::AccessDenied {
            domain,
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Domain tag when this is an access denial
    pub fn denied_domain(&self) -> Option<ProtectedDomain> {
        match self {
            Self::AccessDenied { domain, .. } => Some(*domain),
            _ => None,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        self.denied_domain().is_some()
    }
}

impl From<reqwest::Error> for FilterError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
