//! Session holder.
//!
//! Owns the one [`Session`] of the application. Status changes are published
//! through a `watch` channel together with a session epoch that increases on
//! every transition, so stores can tell whether a response they receive
//! still belongs to the current session.
//!
//! ```text
//! pending ──restore(Some)/sign_in ok──▶ authenticated
//!    │                                     │
//!    └──restore(None)/exchange failed──▶ unauthenticated ◀──sign_out──┘
//! ```

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::instrument;

use shopfront_core::{Email, SessionStatus};

use crate::api::ApiClient;
use crate::error::{Result, StoreError};
use crate::models::account::MIN_PASSWORD_LENGTH;
use crate::models::{Credential, NewAccount, Session, SessionUser};
use crate::notify::Notifier;

/// Point-in-time view of the session.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    /// Present exactly when `status` is `Authenticated`.
    pub session: Option<Arc<Session>>,
    /// Incremented on every transition.
    pub epoch: u64,
}

impl SessionSnapshot {
    /// The session, if authenticated.
    #[must_use]
    pub fn authenticated(&self) -> Option<&Arc<Session>> {
        self.session
            .as_ref()
            .filter(|_| self.status.is_authenticated())
    }
}

/// Holds the bearer credential and user identity.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionHolder {
    inner: Arc<SessionHolderInner>,
}

struct SessionHolderInner {
    api: ApiClient,
    notifier: Notifier,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionHolder {
    /// Create a holder in the `pending` state.
    #[must_use]
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(SessionHolderInner {
                api,
                notifier,
                state,
            }),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.state.borrow().epoch
    }

    /// The current session, if authenticated.
    #[must_use]
    pub fn session(&self) -> Option<Arc<Session>> {
        self.inner.state.borrow().authenticated().cloned()
    }

    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.session().map(|session| session.credential.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.session().map(|session| session.user.clone())
    }

    /// Observe status changes. The receiver starts at the current snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Resolve `pending` from a previously stored session.
    pub fn restore(&self, previous: Option<Session>) -> SessionStatus {
        match previous {
            Some(session) => {
                self.establish(session);
            }
            None => self.clear(),
        }
        self.status()
    }

    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the exchange fails; the holder is then
    /// unauthenticated.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<Arc<Session>> {
        match self.inner.api.sign_in(email, password).await {
            Ok(session) => {
                let session = self.establish(session);
                self.inner.notifier.success("Signed in successfully");
                Ok(session)
            }
            Err(e) => {
                self.clear();
                let message = if e.is_unauthorized() {
                    "Invalid email or password.".to_string()
                } else {
                    e.user_message("Login failed. Please try again.")
                };
                self.inner.notifier.error(message);
                Err(e.into())
            }
        }
    }

    /// Register an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` without making a request when the
    /// form is invalid, or `StoreError::Api` when registration fails.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn sign_up(&self, account: &NewAccount) -> Result<Arc<Session>> {
        if let Err(message) = account.validate() {
            self.inner.notifier.error(message.clone());
            return Err(StoreError::InvalidInput(message));
        }

        match self.inner.api.sign_up(account).await {
            Ok(session) => {
                let session = self.establish(session);
                self.inner.notifier.success("Account created");
                Ok(session)
            }
            Err(e) => {
                self.clear();
                self.inner
                    .notifier
                    .error(e.user_message("Registration failed. Please try again."));
                Err(e.into())
            }
        }
    }

    /// Drop the session.
    pub fn sign_out(&self) {
        let was_authenticated = self.status().is_authenticated();
        self.clear();
        if was_authenticated {
            self.inner.notifier.success("Signed out");
        }
    }

    // =========================================================================
    // Account recovery
    // =========================================================================

    /// Ask the server to email a reset code.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the server does not confirm.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &Email) -> Result<()> {
        match self.inner.api.forgot_password(email).await {
            Ok(()) => {
                self.inner
                    .notifier
                    .success("Reset code sent. Check your email inbox/spam.");
                Ok(())
            }
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to send reset email"));
                Err(e.into())
            }
        }
    }

    /// Verify the emailed reset code.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` for an empty code, or
    /// `StoreError::Api` if the server rejects it.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(self.invalid("Please enter the reset code"));
        }

        match self.inner.api.verify_reset_code(code).await {
            Ok(()) => {
                self.inner
                    .notifier
                    .success("Code verified. You can now reset your password.");
                Ok(())
            }
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to verify code"));
                Err(e.into())
            }
        }
    }

    /// Set a new password; the fresh credential becomes the session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` for a too-short password, or
    /// `StoreError::Api` if the reset fails.
    #[instrument(skip(self, new_password), fields(email = %email))]
    pub async fn reset_password(
        &self,
        email: &Email,
        new_password: &SecretString,
    ) -> Result<Arc<Session>> {
        if new_password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(self.invalid(&format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        match self.inner.api.reset_password(email, new_password).await {
            Ok(session) => {
                let session = self.establish(session);
                self.inner.notifier.success("Password updated");
                Ok(session)
            }
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to reset password"));
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn establish(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut epoch = 0;
        self.inner.state.send_modify(|state| {
            state.epoch += 1;
            state.status = SessionStatus::Authenticated;
            state.session = Some(Arc::clone(&session));
            epoch = state.epoch;
        });
        tracing::info!(user_id = %session.user.id, epoch, "Session established");
        session
    }

    fn clear(&self) {
        let mut epoch = None;
        self.inner.state.send_if_modified(|state| {
            if state.status == SessionStatus::Unauthenticated && state.session.is_none() {
                return false;
            }
            state.epoch += 1;
            state.status = SessionStatus::Unauthenticated;
            state.session = None;
            epoch = Some(state.epoch);
            true
        });
        if let Some(epoch) = epoch {
            tracing::info!(epoch, "Session cleared");
        }
    }

    fn invalid(&self, message: &str) -> StoreError {
        self.inner.notifier.error(message);
        StoreError::InvalidInput(message.to_string())
    }
}
