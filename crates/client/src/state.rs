//! The application value that owns every store.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use shopfront_core::SessionStatus;

use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::models::Session;
use crate::notify::Notifier;
use crate::services::{AddressBook, CartSynchronizer, Checkout, SessionHolder, WishlistStore};

/// Storefront state shared by a front end.
///
/// Created once and handed to whatever needs it. All stores share one API
/// client, one notifier and one session holder. This struct is cheaply
/// cloneable via `Arc`.
///
/// # Lifecycle
///
/// - [`Storefront::start`] restores a prior session (or resolves to signed
///   out) and makes the cart follow the session from then on
/// - [`Storefront::sign_out`] drops the session and tears down local state
/// - dropping the last clone stops the background follower
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    api: ApiClient,
    notifier: Notifier,
    session: SessionHolder,
    cart: CartSynchronizer,
    wishlist: WishlistStore,
    addresses: AddressBook,
    checkout: Checkout,
    follower: Mutex<Option<JoinHandle<()>>>,
}

impl Storefront {
    /// Create storefront state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(ApiClient::new(config)?))
    }

    /// Create storefront state around an existing API client.
    #[must_use]
    pub fn with_client(api: ApiClient) -> Self {
        let notifier = Notifier::new();
        let session = SessionHolder::new(api.clone(), notifier.clone());
        let cart = CartSynchronizer::new(api.clone(), session.clone(), notifier.clone());
        let wishlist = WishlistStore::new(api.clone(), session.clone(), notifier.clone());
        let addresses = AddressBook::new(api.clone(), session.clone(), notifier.clone());
        let checkout = Checkout::new(api.clone(), session.clone(), cart.clone(), notifier.clone());

        Self {
            inner: Arc::new(StorefrontInner {
                api,
                notifier,
                session,
                cart,
                wishlist,
                addresses,
                checkout,
                follower: Mutex::new(None),
            }),
        }
    }

    /// Resolve the pending session and start keeping the cart in sync.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, previous: Option<Session>) -> SessionStatus {
        if let Ok(mut follower) = self.inner.follower.lock()
            && follower.is_none()
        {
            *follower = Some(self.inner.cart.follow_session());
        }
        self.inner.session.restore(previous)
    }

    /// Resolve the pending session without starting the follower.
    ///
    /// For one-shot front ends that refresh explicitly.
    pub fn restore(&self, previous: Option<Session>) -> SessionStatus {
        self.inner.session.restore(previous)
    }

    /// Drop the session and clear every local store.
    pub fn sign_out(&self) {
        self.inner.session.sign_out();
        self.inner.cart.reset();
        self.inner.wishlist.clear();
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn session(&self) -> &SessionHolder {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartSynchronizer {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.inner.addresses
    }

    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }
}

impl Drop for StorefrontInner {
    fn drop(&mut self) {
        if let Ok(follower) = self.follower.get_mut()
            && let Some(handle) = follower.take()
        {
            handle.abort();
        }
    }
}
