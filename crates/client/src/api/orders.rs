//! Order history and cash-on-delivery checkout.

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use shopfront_core::{CartId, UserId};

use super::types::{CashOrderRequest, RawOrderList};
use super::{ApiClient, ApiError, conversions};
use crate::models::{Credential, Order, ShippingAddress};

impl ApiClient {
    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is neither a bare
    /// array nor a `data` envelope.
    #[instrument(skip(self, credential), fields(user_id = %user_id))]
    pub async fn get_orders(
        &self,
        credential: &Credential,
        user_id: &UserId,
    ) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint(&["orders", "user", user_id.as_str()])?;
        let raw: RawOrderList = self
            .send(self.authed(Method::GET, url, credential))
            .await?;

        let mut orders: Vec<Order> = raw
            .into_vec()
            .into_iter()
            .filter_map(conversions::order)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Place a cash-on-delivery order for the given cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the envelope does not report success.
    #[instrument(skip(self, credential, address), fields(cart_id = %cart_id))]
    pub async fn create_cash_order(
        &self,
        credential: &Credential,
        cart_id: &CartId,
        address: &ShippingAddress,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["orders", cart_id.as_str()])?;
        let body = CashOrderRequest {
            shipping_address: conversions::shipping_request(address),
        };
        self.send_mutation::<Value>(self.authed(Method::POST, url, credential).json(&body))
            .await?;
        Ok(())
    }
}
