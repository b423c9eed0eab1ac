//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SHOPFRONT_API_URL` - Base URL of the remote store API
//!   (default: `https://ecommerce.routemisr.com/api/v1`)
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache time-to-live (default: 300)
//! - `SHOPFRONT_CATALOG_CACHE_CAPACITY` - Catalog cache entry limit (default: 1000)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default remote API base URL.
pub const DEFAULT_API_URL: &str = "https://ecommerce.routemisr.com/api/v1";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CATALOG_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Remote API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to. Always ends with `/`.
    pub api_url: Url,
    /// Upper bound for a single request, connect through body.
    pub http_timeout: Duration,
    /// How long catalog responses stay cached.
    pub catalog_cache_ttl: Duration,
    /// Maximum number of cached catalog responses.
    pub catalog_cache_capacity: u64,
}

impl ClientConfig {
    /// Build a configuration for the given API base URL with default tuning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` (keyed on `SHOPFRONT_API_URL`) if
    /// the URL does not parse or is not http(s).
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("SHOPFRONT_API_URL", api_url)?,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            catalog_cache_capacity: DEFAULT_CATALOG_CACHE_CAPACITY,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("SHOPFRONT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_api_url("SHOPFRONT_API_URL", &api_url)?,
            http_timeout: Duration::from_secs(parse_u64(
                &lookup,
                "SHOPFRONT_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            catalog_cache_ttl: Duration::from_secs(parse_u64(
                &lookup,
                "SHOPFRONT_CATALOG_CACHE_TTL_SECS",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            )?),
            catalog_cache_capacity: parse_u64(
                &lookup,
                "SHOPFRONT_CATALOG_CACHE_CAPACITY",
                DEFAULT_CATALOG_CACHE_CAPACITY,
            )?,
        })
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Override the catalog cache time-to-live.
    #[must_use]
    pub const fn with_catalog_cache_ttl(mut self, ttl: Duration) -> Self {
        self.catalog_cache_ttl = ttl;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalize the API base URL so relative joins keep its path.
fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Parse an optional integer variable, falling back to `default`.
fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(
            config.api_url.as_str(),
            "https://ecommerce.routemisr.com/api/v1/"
        );
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.catalog_cache_capacity, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SHOPFRONT_API_URL", "http://127.0.0.1:8080/api/v1/"),
            ("SHOPFRONT_HTTP_TIMEOUT_SECS", "3"),
            ("SHOPFRONT_CATALOG_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8080/api/v1/");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.catalog_cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = ClientConfig::from_lookup(lookup_from(&[(
            "SHOPFRONT_HTTP_TIMEOUT_SECS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SHOPFRONT_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let config = ClientConfig::new("https://shop.example.com/api/v1?x=1").unwrap();
        assert_eq!(config.api_url.as_str(), "https://shop.example.com/api/v1/");
    }

    #[test]
    fn test_api_url_rejects_other_schemes() {
        assert!(ClientConfig::new("ftp://shop.example.com/").is_err());
        assert!(ClientConfig::new("not a url").is_err());
    }
}
