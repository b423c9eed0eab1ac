//! Command implementations.
//!
//! Every command runs against one [`Context`]: storefront state restored
//! from the session file. Store operations already emit user-facing
//! notifications, so commands only print data.

pub mod address;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

use thiserror::Error;

use shopfront_client::{ApiError, ConfigError, StoreError, Storefront};
use shopfront_core::{Email, EmailError};

use crate::config::CliConfig;
use crate::session_file::{SessionFile, SessionFileError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A catalog request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session file could not be read or written.
    #[error(transparent)]
    SessionFile(#[from] SessionFileError),

    /// Invalid email argument.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Any other invalid argument.
    #[error("{0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Whether the server rejected the stored credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Store(e) => e.is_unauthorized(),
            Self::Api(e) => e.is_unauthorized(),
            _ => false,
        }
    }
}

/// Storefront state plus where its session is persisted.
pub struct Context {
    storefront: Storefront,
    session_file: SessionFile,
}

impl Context {
    /// Build the storefront and restore the stored session.
    ///
    /// An unreadable session file is logged and treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn open(config: &CliConfig) -> Result<Self, CliError> {
        let storefront = Storefront::new(&config.client)?;
        let session_file = SessionFile::new(config.session_file.clone());

        let previous = match session_file.load().await {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        };
        let status = storefront.restore(previous);
        tracing::debug!(%status, "Session restored");

        Ok(Self {
            storefront,
            session_file,
        })
    }

    #[must_use]
    pub const fn storefront(&self) -> &Storefront {
        &self.storefront
    }

    /// Write the current session to disk, or remove the file when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub async fn persist_session(&self) -> Result<(), CliError> {
        match self.storefront.session().session() {
            Some(session) => self.session_file.save(&session).await?,
            None => self.session_file.clear().await?,
        }
        Ok(())
    }

    /// Sign out locally and remove the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be removed.
    pub async fn forget_session(&self) -> Result<(), CliError> {
        self.storefront.sign_out();
        self.session_file.clear().await?;
        Ok(())
    }
}

/// Parse an email argument.
pub(crate) fn parse_email(input: &str) -> Result<Email, CliError> {
    Ok(Email::parse(input)?)
}
