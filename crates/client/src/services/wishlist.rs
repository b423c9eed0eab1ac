//! Wishlist store.
//!
//! Same call-then-refetch pattern as the cart, except removal: the item
//! disappears locally first and comes back if the server refuses.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;

use shopfront_core::ProductId;

use super::SessionHolder;
use crate::api::ApiClient;
use crate::error::{Result, StoreError};
use crate::models::{Product, Session};
use crate::notify::Notifier;

const SIGN_IN_MESSAGE: &str = "Please sign in to use wishlist";

/// Local copy of the user's wishlist.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<WishlistInner>,
}

struct WishlistInner {
    api: ApiClient,
    session: SessionHolder,
    notifier: Notifier,
    items: watch::Sender<Vec<Product>>,
}

impl WishlistStore {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionHolder, notifier: Notifier) -> Self {
        let (items, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(WishlistInner {
                api,
                session,
                notifier,
                items,
            }),
        }
    }

    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.inner.items.borrow().clone()
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.inner
            .items
            .borrow()
            .iter()
            .any(|product| &product.id == product_id)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.inner.items.subscribe()
    }

    /// Re-fetch the wishlist. Signed out, it is cleared without a request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` if the fetch fails; local state is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Product>> {
        let snapshot = self.inner.session.snapshot();
        let Some(session) = snapshot.authenticated().cloned() else {
            self.clear();
            return Ok(Vec::new());
        };

        match self.inner.api.get_wishlist(&session.credential).await {
            Ok(products) => {
                if snapshot.epoch == self.inner.session.epoch() {
                    self.inner.items.send_replace(products.clone());
                }
                Ok(products)
            }
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to load wishlist"));
                Err(e.into())
            }
        }
    }

    /// Add a product, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a request when signed
    /// out, or `StoreError::Api` when the server rejects the mutation.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> Result<Vec<Product>> {
        let session = self.require_session()?;

        match self
            .inner
            .api
            .add_to_wishlist(&session.credential, product_id)
            .await
        {
            Ok(()) => {
                self.inner.notifier.success("Added to wishlist");
                self.refresh().await
            }
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to update wishlist. Please try again."));
                Err(e.into())
            }
        }
    }

    /// Remove a product optimistically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a request when signed
    /// out, or `StoreError::Api` when the server refuses; the product is
    /// then restored locally.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<()> {
        let session = self.require_session()?;
        let epoch = self.inner.session.epoch();

        let previous = self.inner.items.borrow().clone();
        self.inner
            .items
            .send_modify(|items| items.retain(|product| &product.id != product_id));

        match self
            .inner
            .api
            .remove_from_wishlist(&session.credential, product_id)
            .await
        {
            Ok(()) => {
                self.inner.notifier.success("Product removed from wishlist");
                Ok(())
            }
            Err(e) => {
                if epoch == self.inner.session.epoch() {
                    self.inner.items.send_replace(previous);
                }
                self.inner
                    .notifier
                    .error(e.user_message("Failed to remove item from wishlist"));
                Err(e.into())
            }
        }
    }

    /// Drop local state.
    pub fn clear(&self) {
        self.inner.items.send_if_modified(|items| {
            let changed = !items.is_empty();
            items.clear();
            changed
        });
    }

    fn require_session(&self) -> Result<Arc<Session>> {
        self.inner.session.session().ok_or_else(|| {
            self.inner.notifier.error(SIGN_IN_MESSAGE);
            StoreError::Unauthenticated
        })
    }
}
