//! Store-level error type.
//!
//! Every store operation reports failures twice: once as a user-facing
//! [`crate::Notification`] and once as a returned [`StoreError`], so callers
//! that need to branch (the CLI's exit code, tests) can.

use thiserror::Error;

use crate::api::ApiError;

/// Errors returned by the session holder and the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation needs a signed-in session.
    #[error("Not signed in")]
    Unauthenticated,

    /// The remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A resource the operation depends on does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Whether the failure came from the server rejecting the credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
