//! Session types.
//!
//! A [`Session`] is created by a successful credential exchange and dropped
//! on sign-out. Only the session holder creates or replaces one; everything
//! else reads it through an `Arc`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use shopfront_core::{Email, UserId};

/// Opaque bearer token issued by the remote sign-in endpoint.
///
/// Sent in the `token` header of every authenticated request. `Debug`
/// never prints the token.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for request headers and session persistence.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// The `id` claim of the token's JWT payload, if it has one.
    ///
    /// The signature is not verified; the claim is only used to address
    /// the user's own resources on the server that issued the token.
    #[must_use]
    pub fn user_id_claim(&self) -> Option<UserId> {
        self.claims()?
            .id
            .filter(|id| !id.trim().is_empty())
            .map(UserId::new)
    }

    /// The `name` claim of the token's JWT payload, if it has one.
    #[must_use]
    pub fn name_claim(&self) -> Option<String> {
        self.claims()?.name.filter(|name| !name.trim().is_empty())
    }

    fn claims(&self) -> Option<Claims> {
        let payload = self.expose_secret().split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[derive(Deserialize)]
struct Claims {
    id: Option<String>,
    name: Option<String>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Remote user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Sign-in email address.
    pub email: Email,
}

/// An authenticated session: credential plus user identity.
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub user: SessionUser,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jwt_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super-secret-token");
        let debug = format!("{credential:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_user_id_claim() {
        let token = jwt_with_payload(r#"{"id":"6407cf6f515bdcf347c09f17","name":"Ahmed","iat":1}"#);
        let credential = Credential::new(token);
        assert_eq!(
            credential.user_id_claim(),
            Some(UserId::new("6407cf6f515bdcf347c09f17"))
        );
        assert_eq!(credential.name_claim().as_deref(), Some("Ahmed"));
    }

    #[test]
    fn test_user_id_claim_missing() {
        let credential = Credential::new(jwt_with_payload(r#"{"name":"Ahmed"}"#));
        assert_eq!(credential.user_id_claim(), None);
    }

    #[test]
    fn test_user_id_claim_not_a_jwt() {
        assert_eq!(Credential::new("opaque").user_id_claim(), None);
        assert_eq!(Credential::new("a.!!!.c").user_id_claim(), None);
    }
}
