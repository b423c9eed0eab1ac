//! REST client for the remote store API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth; nothing is persisted locally
//! - Authenticated endpoints take the [`Credential`] explicitly, so the
//!   client itself holds no session state and can be shared freely
//! - Public catalog responses are cached in memory via `moka`
//! - Raw responses are parsed into the lenient types in [`types`] and then
//!   normalized into [`crate::models`] by [`conversions`]
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//! let page = client.list_products(1, 20).await?;
//! let cart = client.get_cart(&session.credential).await?;
//! ```

mod addresses;
mod auth;
pub mod cache;
mod cart;
mod catalog;
pub(crate) mod conversions;
mod orders;
pub(crate) mod types;
mod wishlist;

pub use catalog::SEARCH_PAGE_SIZE;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;
use crate::models::Credential;
use cache::{CacheKey, CacheValue};
use types::{Envelope, ErrorBody};

/// Header carrying the bearer credential.
pub const TOKEN_HEADER: &str = "token";

/// Errors that can occur when talking to the remote store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection, timeout, TLS.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// 2xx response whose envelope did not report success.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but lacks a field we cannot do without.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Message suitable for showing to a shopper.
    ///
    /// Server-provided messages are passed through; everything else
    /// collapses to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            }
            | Self::Rejected(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            Self::NotFound(what) => format!("{what} not found"),
            _ => fallback.to_string(),
        }
    }

    /// Whether the server rejected the credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote store API.
///
/// Cheap to clone; all clones share one connection pool and one catalog
/// cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built (for
    /// example when no TLS backend is available).
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(config.catalog_cache_capacity)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// The configured API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Malformed("API base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.client.request(method, url)
    }

    fn authed(&self, method: Method, url: Url, credential: &Credential) -> RequestBuilder {
        self.request(method, url)
            .header(TOKEN_HEADER, credential.expose_secret())
    }

    /// Send a request and parse the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send_raw(request).await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&text, 500),
                "Failed to parse store API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose body must be an envelope reporting success.
    async fn send_mutation<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let envelope: Envelope<T> = self.send(request).await?;
        if envelope.is_success() {
            Ok(envelope)
        } else {
            let message = envelope
                .message
                .or(envelope.status_msg)
                .unwrap_or_else(|| "Request was not accepted".to_string());
            tracing::warn!(message = %message, "Store API rejected mutation");
            Err(ApiError::Rejected(message))
        }
    }

    /// Send a request and return the body text of a 2xx response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message.or_else(|| body.errors.and_then(|e| e.msg)));

            if status.is_client_error() {
                tracing::warn!(
                    status = %status,
                    body = %truncate(&text, 500),
                    "Store API returned client error"
                );
            } else {
                tracing::error!(
                    status = %status,
                    body = %truncate(&text, 500),
                    "Store API returned non-success status"
                );
            }
            return Err(ApiError::Status { status, message });
        }

        Ok(text)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = client("https://shop.example.com/api/v1");
        let url = client.endpoint(&["cart", "abc123"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/v1/cart/abc123");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("https://shop.example.com/api/v1/");
        let url = client.endpoint(&["cart", "../admin?x=1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.example.com/api/v1/cart/..%2Fadmin%3Fx=1"
        );
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            message: Some("Invalid Token. please login again".to_string()),
        };
        assert_eq!(
            err.user_message("Failed to load cart"),
            "Invalid Token. please login again"
        );
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(err.user_message("Failed to load cart"), "Failed to load cart");
        assert!(!err.is_unauthorized());

        let err = ApiError::Malformed("missing token".to_string());
        assert_eq!(err.user_message("Login failed"), "Login failed");

        let err = ApiError::Rejected("  ".to_string());
        assert_eq!(err.user_message("Failed to add to cart"), "Failed to add to cart");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("héllo", 2), "hé");
    }
}
