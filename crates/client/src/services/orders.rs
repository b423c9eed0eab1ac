//! Order history and cash-on-delivery checkout.

use std::sync::Arc;

use tracing::instrument;

use shopfront_core::CartId;

use super::{CartSynchronizer, SessionHolder};
use crate::api::ApiClient;
use crate::error::{Result, StoreError};
use crate::models::{Order, Session, ShippingAddress};
use crate::notify::Notifier;

/// Places orders and lists past ones.
#[derive(Clone)]
pub struct Checkout {
    api: ApiClient,
    session: SessionHolder,
    cart: CartSynchronizer,
    notifier: Notifier,
}

impl Checkout {
    #[must_use]
    pub const fn new(
        api: ApiClient,
        session: SessionHolder,
        cart: CartSynchronizer,
        notifier: Notifier,
    ) -> Self {
        Self {
            api,
            session,
            cart,
            notifier,
        }
    }

    /// The signed-in user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` when signed out, or
    /// `StoreError::Api` if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let session = self.require_session("Please sign in to view orders")?;
        self.api
            .get_orders(&session.credential, &session.user.id)
            .await
            .map_err(|e| {
                self.notifier.error(e.user_message("Failed to load orders"));
                e.into()
            })
    }

    /// Place a cash-on-delivery order for the current cart.
    ///
    /// The cart ID comes from the synchronizer's snapshot, or from a fresh
    /// cart fetch when the snapshot has none. On success the cart (emptied by
    /// the server) is refreshed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` when signed out,
    /// `StoreError::NotFound` when there is no cart,
    /// `StoreError::InvalidInput` for an incomplete address, or
    /// `StoreError::Api` if the server rejects the order.
    #[instrument(skip(self, address))]
    pub async fn place_cash_order(&self, address: &ShippingAddress) -> Result<()> {
        let session = self.require_session("Please sign in")?;

        let Some(cart_id) = self.resolve_cart_id(&session).await else {
            self.notifier.error("Cart not found");
            return Err(StoreError::NotFound("cart".to_string()));
        };

        if address.details.trim().is_empty() || address.phone.trim().is_empty() {
            self.notifier.error("Select an address");
            return Err(StoreError::InvalidInput("Select an address".to_string()));
        }

        if let Err(e) = self
            .api
            .create_cash_order(&session.credential, &cart_id, address)
            .await
        {
            self.notifier.error(e.user_message("Failed to create order"));
            return Err(e.into());
        }

        self.notifier.success("Order placed (Cash on Delivery)");
        // Refresh failures are reported by the synchronizer itself
        let _ = self.cart.refresh().await;
        Ok(())
    }

    async fn resolve_cart_id(&self, session: &Session) -> Option<CartId> {
        if let Some(cart_id) = self.cart.snapshot().cart_id {
            return Some(cart_id);
        }
        match self.api.get_cart(&session.credential).await {
            Ok(summary) => summary.cart_id,
            Err(e) => {
                tracing::debug!(error = %e, "Could not resolve cart id");
                None
            }
        }
    }

    fn require_session(&self, message: &str) -> Result<Arc<Session>> {
        self.session.session().ok_or_else(|| {
            self.notifier.error(message);
            StoreError::Unauthenticated
        })
    }
}
