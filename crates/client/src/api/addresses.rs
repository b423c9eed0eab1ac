//! Address book endpoints.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use shopfront_core::AddressId;

use super::types::{AddressRequest, RawAddress, RawList};
use super::{ApiClient, ApiError, conversions};
use crate::models::{Address, Credential, NewAddress};

impl ApiClient {
    /// List the signed-in user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be parsed.
    #[instrument(skip(self, credential))]
    pub async fn get_addresses(&self, credential: &Credential) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoint(&["addresses"])?;
        let raw: RawList<RawAddress> = self
            .send(self.authed(Method::GET, url, credential))
            .await?;
        Ok(raw.data.into_iter().filter_map(conversions::address).collect())
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential, address), fields(name = %address.name))]
    pub async fn add_address(
        &self,
        credential: &Credential,
        address: &NewAddress,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["addresses"])?;
        let body = AddressRequest {
            name: address.name.trim(),
            details: address.details.trim(),
            phone: address.phone.trim(),
            city: address.city.trim(),
        };
        self.send_mutation::<Value>(self.authed(Method::POST, url, credential).json(&body))
            .await?;
        Ok(())
    }

    /// Delete a saved address.
    ///
    /// Any 2xx response counts as success; the body is not inspected.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, credential), fields(address_id = %address_id))]
    pub async fn remove_address(
        &self,
        credential: &Credential,
        address_id: &AddressId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["addresses", address_id.as_str()])?;
        self.send_raw(self.authed(Method::DELETE, url, credential))
            .await?;
        Ok(())
    }
}
