//! Cart endpoints.
//!
//! Mutations return only whether the server accepted them. Callers re-fetch
//! the whole cart with [`ApiClient::get_cart`] afterwards instead of trusting
//! the mutation response, whose `product` fields are unpopulated.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use shopfront_core::{ProductId, Quantity};

use super::types::{CountRequest, ProductIdRequest, RawCartResponse};
use super::{ApiClient, ApiError, conversions};
use crate::models::{CartSummary, Credential};

impl ApiClient {
    /// Fetch and normalize the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status (401 for
    /// a stale token, 404 when the user has never had a cart), an
    /// unparseable body, or totals that overflow (`ApiError::Malformed`).
    #[instrument(skip(self, credential))]
    pub async fn get_cart(&self, credential: &Credential) -> Result<CartSummary, ApiError> {
        let url = self.endpoint(&["cart"])?;
        let raw: RawCartResponse = self
            .send(self.authed(Method::GET, url, credential))
            .await?;
        conversions::cart_summary(raw)
    }

    /// Add one unit of a product, creating the line if needed.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart"])?;
        let body = ProductIdRequest {
            product_id: product_id.as_str(),
        };
        self.send_mutation::<Value>(self.authed(Method::POST, url, credential).json(&body))
            .await?;
        Ok(())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential), fields(product_id = %product_id, count = quantity.get()))]
    pub async fn update_cart_item(
        &self,
        credential: &Credential,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart", product_id.as_str()])?;
        let body = CountRequest {
            count: quantity.get(),
        };
        self.send_mutation::<Value>(self.authed(Method::PUT, url, credential).json(&body))
            .await?;
        Ok(())
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential), fields(product_id = %product_id))]
    pub async fn remove_cart_item(
        &self,
        credential: &Credential,
        product_id: &ProductId,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart", product_id.as_str()])?;
        self.send_mutation::<Value>(self.authed(Method::DELETE, url, credential))
            .await?;
        Ok(())
    }
}
