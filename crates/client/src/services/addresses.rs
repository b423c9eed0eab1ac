//! Address book.

use std::sync::Arc;

use tracing::instrument;

use shopfront_core::AddressId;

use super::SessionHolder;
use crate::api::ApiClient;
use crate::error::{Result, StoreError};
use crate::models::{Address, NewAddress, Session};
use crate::notify::Notifier;

const SIGN_IN_MESSAGE: &str = "Please sign in to manage addresses";

/// The signed-in user's saved shipping addresses.
///
/// Holds no local copy; every call goes to the server.
#[derive(Clone)]
pub struct AddressBook {
    api: ApiClient,
    session: SessionHolder,
    notifier: Notifier,
}

impl AddressBook {
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionHolder, notifier: Notifier) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    /// List saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` when signed out, or
    /// `StoreError::Api` if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Address>> {
        let session = self.require_session()?;
        self.api
            .get_addresses(&session.credential)
            .await
            .map_err(|e| {
                self.notifier
                    .error(e.user_message("Failed to load addresses"));
                e.into()
            })
    }

    /// Save an address and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` without a request if a field is
    /// blank, or `StoreError::Api` if the server rejects it.
    #[instrument(skip(self, address), fields(name = %address.name))]
    pub async fn add(&self, address: &NewAddress) -> Result<Vec<Address>> {
        let session = self.require_session()?;

        let fields = [&address.name, &address.details, &address.phone, &address.city];
        if fields.iter().any(|field| field.trim().is_empty()) {
            let message = "Please fill in all address fields";
            self.notifier.error(message);
            return Err(StoreError::InvalidInput(message.to_string()));
        }

        if let Err(e) = self.api.add_address(&session.credential, address).await {
            self.notifier.error(e.user_message("Failed to add address"));
            return Err(e.into());
        }
        self.notifier.success("Address added");
        self.list().await
    }

    /// Delete an address and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` when signed out, or
    /// `StoreError::Api` if the server rejects the removal.
    #[instrument(skip(self), fields(address_id = %address_id))]
    pub async fn remove(&self, address_id: &AddressId) -> Result<Vec<Address>> {
        let session = self.require_session()?;

        if let Err(e) = self
            .api
            .remove_address(&session.credential, address_id)
            .await
        {
            self.notifier
                .error(e.user_message("Failed to remove address"));
            return Err(e.into());
        }
        self.notifier.success("Address removed");
        self.list().await
    }

    fn require_session(&self) -> Result<Arc<Session>> {
        self.session.session().ok_or_else(|| {
            self.notifier.error(SIGN_IN_MESSAGE);
            StoreError::Unauthenticated
        })
    }
}
