//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Client settings (see `shopfront_client::config`) plus, all optional:
//! - `SHOPFRONT_SESSION_FILE` - Where the signed-in session is kept
//!   (default: `.shopfront-session.json`)
//! - `SENTRY_DSN` - Sentry DSN for error tracking
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (e.g. `production`)

use std::path::PathBuf;

use shopfront_client::{ClientConfig, ConfigError};

const DEFAULT_SESSION_FILE: &str = ".shopfront-session.json";

/// CLI configuration.
#[derive(Clone)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub session_file: PathBuf,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("client", &self.client)
            .field("session_file", &self.session_file)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a client variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client = ClientConfig::from_env()?;

        Ok(Self {
            client,
            session_file: PathBuf::from(get_env_or_default(
                "SHOPFRONT_SESSION_FILE",
                DEFAULT_SESSION_FILE,
            )),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

/// Get an optional environment variable, treating blank as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
