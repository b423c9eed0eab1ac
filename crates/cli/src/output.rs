//! Plain-text rendering for command results.
//!
//! Renderers return strings so they can be tested; the `print_*` wrappers
//! write them to stdout.

#![allow(clippy::print_stdout)]

use std::fmt::Write as _;

use tokio::sync::broadcast::{self, error::TryRecvError};

use shopfront_client::models::{Address, CartSummary, Order, Product, SessionUser};
use shopfront_client::{Notification, NotificationKind};

pub fn print_line(line: &str) {
    println!("{line}");
}

pub fn print_user(user: &SessionUser) {
    println!("{} <{}> ({})", user.name, user.email, user.id);
}

pub fn print_cart(cart: &CartSummary) {
    print!("{}", render_cart(cart));
}

pub fn print_products(products: &[Product]) {
    print!("{}", render_products(products));
}

pub fn print_product_detail(product: &Product) {
    print!("{}", render_product_detail(product));
}

pub fn print_addresses(addresses: &[Address]) {
    print!("{}", render_addresses(addresses));
}

pub fn print_orders(orders: &[Order]) {
    print!("{}", render_orders(orders));
}

/// Print every notification emitted so far.
pub fn print_notifications(receiver: &mut broadcast::Receiver<Notification>) {
    loop {
        match receiver.try_recv() {
            Ok(notification) => println!("{}", render_notification(&notification)),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Notifications dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

// =============================================================================
// Renderers
// =============================================================================

#[must_use]
pub fn render_notification(notification: &Notification) -> String {
    match notification.kind {
        NotificationKind::Success => format!("ok: {}", notification.message),
        NotificationKind::Error => format!("error: {}", notification.message),
    }
}

#[must_use]
pub fn render_cart(cart: &CartSummary) -> String {
    if cart.is_empty() {
        return "Your cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in &cart.items {
        let _ = writeln!(
            out,
            "{:>3} x {}  @ {}  = {}  [{}]",
            item.quantity,
            item.title,
            item.unit_price,
            item.line_total(),
            item.product_id
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.item_count,
        cart.subtotal.display_with_currency()
    );
    out
}

#[must_use]
pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products\n".to_string();
    }

    let mut out = String::new();
    for product in products {
        let price = product.effective_price();
        let _ = write!(out, "{}  {}  {}", product.id, product.title, price);
        if price < product.price {
            let _ = write!(out, " (was {})", product.price);
        }
        if !product.in_stock() {
            out.push_str("  [out of stock]");
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn render_match_count(count: usize) -> String {
    match count {
        1 => "1 matching product".to_string(),
        n => format!("{n} matching products"),
    }
}

#[must_use]
pub fn render_product_detail(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", product.title);
    let _ = writeln!(out, "ID:       {}", product.id);
    let _ = writeln!(
        out,
        "Price:    {}",
        product.effective_price().display_with_currency()
    );
    if let Some(category) = &product.category {
        let _ = writeln!(out, "Category: {}", category.name);
    }
    if let Some(brand) = &product.brand {
        let _ = writeln!(out, "Brand:    {}", brand.name);
    }
    let _ = writeln!(
        out,
        "Rating:   {:.1} ({} reviews)",
        product.ratings_average, product.ratings_quantity
    );
    let _ = writeln!(out, "In stock: {}", product.quantity);
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    out
}

#[must_use]
pub fn render_addresses(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "No saved addresses\n".to_string();
    }

    let mut out = String::new();
    for address in addresses {
        let _ = writeln!(
            out,
            "{}  {}: {}, {} ({})",
            address.id, address.name, address.details, address.city, address.phone
        );
    }
    out
}

#[must_use]
pub fn render_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet\n".to_string();
    }

    let mut out = String::new();
    for order in orders {
        let number = order
            .number
            .map_or_else(|| order.id.to_string(), |number| format!("#{number}"));
        let placed = order
            .created_at
            .map_or_else(String::new, |at| at.format("%Y-%m-%d").to_string());
        let _ = writeln!(
            out,
            "{number}  {placed}  {} unit(s)  {}  {} ({})",
            order.unit_count(),
            order.total.display_with_currency(),
            order.status(),
            order.payment_method
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_client::models::CartLineItem;
    use shopfront_core::{LineId, Price, ProductId};

    fn line(product: &str, quantity: u32, unit: i64) -> CartLineItem {
        CartLineItem {
            line_id: LineId::new(format!("line-{product}")),
            product_id: ProductId::new(product),
            title: "Cotton Tee".to_string(),
            image_ref: None,
            category: None,
            brand: None,
            unit_price: Price::from_units(unit),
            quantity,
        }
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&CartSummary::empty()), "Your cart is empty\n");
    }

    #[test]
    fn test_render_cart_totals() {
        let cart = CartSummary {
            cart_id: None,
            items: vec![line("p1", 2, 10)],
            item_count: 2,
            subtotal: Price::from_units(20),
        };
        let rendered = render_cart(&cart);
        assert!(rendered.contains("2 x Cotton Tee"));
        assert!(rendered.contains("= 20.00"));
        assert!(rendered.contains("2 item(s), subtotal EGP 20.00"));
    }

    #[test]
    fn test_render_notification() {
        assert_eq!(
            render_notification(&Notification::error("Failed to add to cart")),
            "error: Failed to add to cart"
        );
        assert_eq!(
            render_notification(&Notification::success("Added to cart")),
            "ok: Added to cart"
        );
    }

    #[test]
    fn test_render_no_orders() {
        assert_eq!(render_orders(&[]), "No orders yet\n");
    }

    #[test]
    fn test_render_match_count() {
        assert_eq!(render_match_count(0), "0 matching products");
        assert_eq!(render_match_count(1), "1 matching product");
        assert_eq!(render_match_count(3), "3 matching products");
    }

}
