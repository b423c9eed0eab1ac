//! Cart synchronizer.
//!
//! Keeps a local [`CartSummary`] consistent with the server-side cart. Every
//! mutation is one remote call followed by a full re-fetch; the fetched
//! snapshot replaces local state wholesale.
//!
//! # Sequencing
//!
//! Mutations are not serialized against each other, so refreshes can finish
//! out of order. Each refresh takes a ticket: a monotonically increasing
//! request ID plus the session epoch at issue time. A response is applied
//! only if its request ID is newer than the last applied one and the session
//! epoch has not moved, so the most recently issued refresh wins and nothing
//! from a previous session survives a sign-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use shopfront_core::{ProductId, Quantity, SessionStatus};

use super::SessionHolder;
use crate::api::ApiClient;
use crate::error::{Result, StoreError};
use crate::models::{CartSummary, Session};
use crate::notify::Notifier;

/// Observable cart state.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    /// Latest applied snapshot.
    pub summary: CartSummary,
    /// Refreshes currently awaiting a response.
    pub in_flight: usize,
    last_applied: u64,
}

impl CartState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    request_id: u64,
    epoch: u64,
}

/// Synchronizes the local cart with the remote cart.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartSynchronizer {
    inner: Arc<CartInner>,
}

struct CartInner {
    api: ApiClient,
    session: SessionHolder,
    notifier: Notifier,
    state: watch::Sender<CartState>,
    next_request_id: AtomicU64,
}

impl CartSynchronizer {
    #[must_use]
    pub fn new(api: ApiClient, session: SessionHolder, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self {
            inner: Arc::new(CartInner {
                api,
                session,
                notifier,
                state,
                next_request_id: AtomicU64::new(1),
            }),
        }
    }

    /// The latest applied snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSummary {
        self.inner.state.borrow().summary.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    /// Observe cart changes. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Re-fetch the whole cart and replace local state with it.
    ///
    /// Signed out, this silently clears to the empty cart without a request.
    /// A response superseded by a newer refresh or a session change is
    /// discarded; the returned summary is then the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Api` on transport, status or parse failure, after
    /// emitting one error notification. The prior snapshot is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CartSummary> {
        let snapshot = self.inner.session.snapshot();
        let Some(session) = snapshot.authenticated().cloned() else {
            self.reset();
            return Ok(CartSummary::empty());
        };

        let ticket = self.issue(snapshot.epoch);
        let result = self.inner.api.get_cart(&session.credential).await;

        match result {
            Ok(summary) => {
                if self.finish(ticket, Some(summary.clone())) {
                    debug!(
                        request_id = ticket.request_id,
                        item_count = summary.item_count,
                        "Applied cart snapshot"
                    );
                    Ok(summary)
                } else {
                    debug!(request_id = ticket.request_id, "Discarded stale cart response");
                    Ok(self.snapshot())
                }
            }
            Err(e) => {
                self.finish(ticket, None);
                // Failures from a previous session are nobody's concern now
                if ticket.epoch == self.inner.session.epoch() {
                    self.inner
                        .notifier
                        .error(e.user_message("Failed to load cart"));
                }
                Err(e.into())
            }
        }
    }

    /// Add one unit of a product, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a request when signed
    /// out, or `StoreError::Api` when the server rejects the mutation.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: &ProductId) -> Result<CartSummary> {
        let session = self.require_session("Please sign in to add items to cart")?;

        match self
            .inner
            .api
            .add_to_cart(&session.credential, product_id)
            .await
        {
            Ok(()) => {
                self.inner.notifier.success("Added to cart");
                self.refresh().await
            }
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to add to cart"));
                Err(e.into())
            }
        }
    }

    /// Set a line's quantity, then refresh.
    ///
    /// `quantity` is at least 1 by construction; clamp user input with
    /// [`Quantity::clamped`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a request when signed
    /// out, or `StoreError::Api` when the server rejects the mutation.
    #[instrument(skip(self), fields(product_id = %product_id, count = quantity.get()))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<CartSummary> {
        let session = self.require_session("Please sign in to update cart")?;

        match self
            .inner
            .api
            .update_cart_item(&session.credential, product_id, quantity)
            .await
        {
            Ok(()) => self.refresh().await,
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to update item"));
                Err(e.into())
            }
        }
    }

    /// Remove a product's line, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a request when signed
    /// out, or `StoreError::Api` when the server rejects the mutation.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<CartSummary> {
        let session = self.require_session("Please sign in to update cart")?;

        match self
            .inner
            .api
            .remove_cart_item(&session.credential, product_id)
            .await
        {
            Ok(()) => self.refresh().await,
            Err(e) => {
                self.inner
                    .notifier
                    .error(e.user_message("Failed to remove item"));
                Err(e.into())
            }
        }
    }

    /// Tear down: clear to the empty cart and invalidate every response
    /// still in flight.
    pub fn reset(&self) {
        let barrier = self.inner.next_request_id.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_if_modified(|state| {
            let changed = state.summary != CartSummary::empty();
            state.summary = CartSummary::empty();
            state.last_applied = state.last_applied.max(barrier);
            changed
        });
    }

    /// Follow the session: refresh whenever it becomes authenticated and
    /// reset whenever it becomes unauthenticated.
    ///
    /// The task ends once the synchronizer and the session holder are
    /// dropped.
    pub fn follow_session(&self) -> JoinHandle<()> {
        let weak: Weak<CartInner> = Arc::downgrade(&self.inner);
        let mut sessions = self.inner.session.subscribe();

        tokio::spawn(async move {
            let mut seen_epoch = None;
            loop {
                let (status, epoch) = {
                    let snapshot = sessions.borrow_and_update();
                    (snapshot.status, snapshot.epoch)
                };

                if seen_epoch != Some(epoch) {
                    seen_epoch = Some(epoch);
                    let Some(inner) = weak.upgrade() else { break };
                    let cart = Self { inner };
                    match status {
                        // Errors were already reported as notifications
                        SessionStatus::Authenticated => {
                            let _ = cart.refresh().await;
                        }
                        SessionStatus::Unauthenticated => cart.reset(),
                        SessionStatus::Pending => {}
                    }
                }

                if sessions.changed().await.is_err() {
                    break;
                }
            }
            debug!("Cart stopped following session");
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_session(&self, message: &str) -> Result<Arc<Session>> {
        self.inner.session.session().ok_or_else(|| {
            self.inner.notifier.error(message);
            StoreError::Unauthenticated
        })
    }

    fn issue(&self, epoch: u64) -> Ticket {
        let request_id = self.inner.next_request_id.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_modify(|state| state.in_flight += 1);
        Ticket { request_id, epoch }
    }

    /// Complete a ticket, applying `summary` if the ticket is still current.
    fn finish(&self, ticket: Ticket, summary: Option<CartSummary>) -> bool {
        let current_epoch = self.inner.session.epoch();
        let mut applied = false;
        self.inner.state.send_modify(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
            if let Some(summary) = summary
                && ticket.request_id > state.last_applied
                && ticket.epoch == current_epoch
            {
                state.summary = summary;
                state.last_applied = ticket.request_id;
                applied = true;
            }
        });
        applied
    }
}
