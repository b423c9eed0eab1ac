//! Shopfront Client - storefront state over a remote store API.
//!
//! The remote API owns products, carts, orders and accounts. This crate
//! keeps a local, observable copy of what a shopper sees and talks to the
//! API on their behalf.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - stateless REST client (reqwest, moka catalog cache)
//! - [`SessionHolder`] - the bearer credential and user identity
//! - [`CartSynchronizer`] - server cart mirrored locally, re-fetched after
//!   every mutation with stale responses discarded
//! - [`WishlistStore`], [`AddressBook`], [`Checkout`] - the remaining
//!   account features
//! - [`Notifier`] - transient user-facing messages
//! - [`Storefront`] - owns all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_client::{ClientConfig, Storefront};
//!
//! let storefront = Storefront::new(&ClientConfig::from_env()?)?;
//! storefront.start(None);
//! storefront.session().sign_in(&email, &password).await?;
//! storefront.cart().add_item(&product_id).await?;
//! println!("{}", storefront.cart().snapshot().subtotal);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod state;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use error::{Result, StoreError};
pub use notify::{Notification, NotificationKind, Notifier};
pub use services::{
    AddressBook, CartState, CartSynchronizer, Checkout, SessionHolder, SessionSnapshot,
    WishlistStore,
};
pub use state::Storefront;
