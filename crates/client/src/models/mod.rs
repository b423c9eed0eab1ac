//! Domain models.
//!
//! These types are what consumers see. They are built from the raw wire
//! types in [`crate::api`] and never deserialized straight from responses.

pub mod account;
pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;

pub use account::NewAccount;
pub use address::{Address, NewAddress, ShippingAddress};
pub use cart::{CartLineItem, CartSummary};
pub use catalog::{Brand, Category, Page, Product, ProductFilter};
pub use order::{Order, OrderItem};
pub use session::{Credential, Session, SessionUser};
