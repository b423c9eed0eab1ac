//! Cart view state.
//!
//! Everything here is derived from server responses. A [`CartSummary`] is
//! replaced wholesale on every refresh; lines are never patched in place.

use serde::{Deserialize, Serialize};

use shopfront_core::{CartId, LineId, Price, ProductId};

/// One product entry in the cart with its quantity and price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Server ID of the cart line (stable key for rendering).
    pub line_id: LineId,
    /// Product this line refers to.
    pub product_id: ProductId,
    pub title: String,
    /// Cover image URL.
    pub image_ref: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Unit price at the time the server built the cart.
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartLineItem {
    /// `unit_price × quantity`, saturating.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// `unit_price × quantity`, or `None` on overflow.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Price> {
        self.unit_price.checked_times(self.quantity)
    }
}

/// Normalized snapshot of the server-side cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSummary {
    /// Server cart ID, needed to place an order. `None` for the empty cart.
    pub cart_id: Option<CartId>,
    /// Lines in server order.
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub subtotal: Price,
}

impl CartSummary {
    /// The empty cart shown when signed out or before the first refresh.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for `product_id`, if the cart has one.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Quantity of `product_id` in the cart (0 when absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |item| item.quantity)
    }

    /// Sum of line quantities, saturating.
    #[must_use]
    pub fn computed_item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }

    /// Sum of line totals, saturating.
    #[must_use]
    pub fn computed_subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of line quantities, or `None` on overflow.
    #[must_use]
    pub fn checked_item_count(&self) -> Option<u32> {
        self.items
            .iter()
            .try_fold(0_u32, |count, item| count.checked_add(item.quantity))
    }

    /// Sum of line totals, or `None` on overflow.
    #[must_use]
    pub fn checked_subtotal(&self) -> Option<Price> {
        self.items.iter().try_fold(Price::ZERO, |total, item| {
            total.checked_add(item.checked_line_total()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: &str, quantity: u32, unit: i64) -> CartLineItem {
        CartLineItem {
            line_id: LineId::new(format!("line-{product}")),
            product_id: ProductId::new(product),
            title: product.to_uppercase(),
            image_ref: None,
            category: None,
            brand: None,
            unit_price: Price::from_units(unit),
            quantity,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line("p1", 2, 10).line_total().to_string(), "20.00");
    }

    #[test]
    fn test_computed_totals() {
        let cart = CartSummary {
            cart_id: None,
            items: vec![line("p1", 2, 10), line("p2", 1, 5)],
            item_count: 0,
            subtotal: Price::ZERO,
        };
        assert_eq!(cart.computed_item_count(), 3);
        assert_eq!(cart.computed_subtotal(), Price::from_units(25));
    }

    #[test]
    fn test_checked_totals_detect_overflow() {
        let cart = CartSummary {
            items: vec![line("p1", u32::MAX, 1), line("p2", 1, 1)],
            ..CartSummary::empty()
        };
        assert_eq!(cart.checked_item_count(), None);
        assert_eq!(cart.computed_item_count(), u32::MAX);

        let cart = CartSummary {
            items: vec![line("p1", 2, 10), line("p2", 1, 5)],
            ..CartSummary::empty()
        };
        assert_eq!(cart.checked_item_count(), Some(3));
        assert_eq!(cart.checked_subtotal(), Some(Price::from_units(25)));
    }

    #[test]
    fn test_quantity_of() {
        let cart = CartSummary {
            items: vec![line("p1", 2, 10)],
            ..CartSummary::empty()
        };
        assert_eq!(cart.quantity_of(&ProductId::new("p1")), 2);
        assert_eq!(cart.quantity_of(&ProductId::new("p9")), 0);
    }

    #[test]
    fn test_empty() {
        let cart = CartSummary::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.subtotal.to_string(), "0.00");
    }
}
