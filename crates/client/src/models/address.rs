//! Saved shipping addresses.

use serde::{Deserialize, Serialize};

use shopfront_core::AddressId;

/// An address saved in the user's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    /// Label chosen by the user (e.g. "Home").
    pub name: String,
    /// Street, building, floor.
    pub details: String,
    pub phone: String,
    pub city: String,
}

impl Address {
    /// The subset the order endpoint expects.
    #[must_use]
    pub fn to_shipping(&self) -> ShippingAddress {
        ShippingAddress {
            details: self.details.clone(),
            phone: self.phone.clone(),
            city: self.city.clone(),
        }
    }
}

/// Input for a new address-book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub name: String,
    pub details: String,
    pub phone: String,
    pub city: String,
}

/// Shipping address attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub details: String,
    pub phone: String,
    pub city: String,
}
