//! Credential exchange and account recovery endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;

use shopfront_core::Email;

use super::types::{
    ForgotPasswordRequest, RawAuthResponse, ResetPasswordRequest, SignInRequest, SignUpRequest,
    VerifyResetCodeRequest,
};
use super::{ApiClient, ApiError, conversions};
use crate::models::{NewAccount, Session};

impl ApiClient {
    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for rejected credentials (the server sends
    /// 401 with "Incorrect email or password"), or `ApiError::Malformed` if
    /// the response carries no usable token or user ID.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<Session, ApiError> {
        let url = self.endpoint(&["auth", "signin"])?;
        let body = SignInRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let raw: RawAuthResponse = self.send(self.request(Method::POST, url).json(&body)).await?;
        conversions::session(raw, email)
    }

    /// Register a new account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the server rejects the registration
    /// (for example "Account Already Exists").
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn sign_up(&self, account: &NewAccount) -> Result<Session, ApiError> {
        let url = self.endpoint(&["auth", "signup"])?;
        let password = account.password.expose_secret();
        let body = SignUpRequest {
            name: account.name.trim(),
            email: account.email.as_str(),
            password,
            re_password: password,
            phone: account.phone.trim(),
        };

        let raw: RawAuthResponse = self.send(self.request(Method::POST, url).json(&body)).await?;
        conversions::session(raw, &account.email)
    }

    /// Ask the server to email a password reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &Email) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "forgotPasswords"])?;
        let body = ForgotPasswordRequest {
            email: email.as_str(),
        };
        // Recovery endpoints answer with their own body shapes; the HTTP
        // status alone decides.
        self.send::<Value>(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(())
    }

    /// Check a reset code received by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is invalid or expired.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, code: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "verifyResetCode"])?;
        let body = VerifyResetCodeRequest {
            reset_code: code.trim(),
        };
        self.send::<Value>(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(())
    }

    /// Set a new password after the reset code was verified.
    ///
    /// The server answers with a fresh token, which becomes the new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset is rejected or no token comes back.
    #[instrument(skip(self, new_password), fields(email = %email))]
    pub async fn reset_password(
        &self,
        email: &Email,
        new_password: &SecretString,
    ) -> Result<Session, ApiError> {
        let url = self.endpoint(&["auth", "resetPassword"])?;
        let body = ResetPasswordRequest {
            email: email.as_str(),
            new_password: new_password.expose_secret(),
        };

        let raw: RawAuthResponse = self.send(self.request(Method::PUT, url).json(&body)).await?;
        conversions::session(raw, email)
    }
}
