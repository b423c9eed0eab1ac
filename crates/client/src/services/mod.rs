//! Stateful stores built on [`crate::api::ApiClient`].
//!
//! Every store follows the same contract: check the session, make one
//! remote call, report the outcome as a [`crate::Notification`], and return
//! it as a [`crate::StoreError`] too. Failures never corrupt local state.

mod addresses;
mod cart;
mod orders;
mod session;
mod wishlist;

pub use addresses::AddressBook;
pub use cart::{CartState, CartSynchronizer};
pub use orders::Checkout;
pub use session::{SessionHolder, SessionSnapshot};
pub use wishlist::WishlistStore;
