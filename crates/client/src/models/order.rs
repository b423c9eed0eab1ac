//! Order history types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{FulfillmentStatus, OrderId, PaymentMethod, Price, ProductId};

use super::ShippingAddress;

/// A product line inside a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub image_ref: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Short human-facing order number, when the server assigns one.
    pub number: Option<u64>,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub const fn status(&self) -> FulfillmentStatus {
        FulfillmentStatus::from_flags(self.payment_method, self.is_paid, self.is_delivered)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }
}
