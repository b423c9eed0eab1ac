//! Wishlist endpoints.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use shopfront_core::ProductId;

use super::types::{ProductIdRequest, RawList, RawProduct};
use super::{ApiClient, ApiError, conversions};
use crate::models::{Credential, Product};

impl ApiClient {
    /// Fetch the signed-in user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be parsed.
    #[instrument(skip(self, credential))]
    pub async fn get_wishlist(&self, credential: &Credential) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint(&["wishlist"])?;
        let raw: RawList<RawProduct> = self
            .send(self.authed(Method::GET, url, credential))
            .await?;
        Ok(raw.data.into_iter().filter_map(conversions::product).collect())
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["wishlist"])?;
        let body = ProductIdRequest {
            product_id: product_id.as_str(),
        };
        self.send_mutation::<Value>(self.authed(Method::POST, url, credential).json(&body))
            .await?;
        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["wishlist", product_id.as_str()])?;
        self.send_mutation::<Value>(self.authed(Method::DELETE, url, credential))
            .await?;
        Ok(())
    }
}
