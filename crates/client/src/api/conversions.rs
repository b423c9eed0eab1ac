//! Conversions from raw wire types to domain models.
//!
//! The remote API is lenient about types, so every numeric field goes
//! through [`decimal`] / [`whole`], which accept JSON numbers and numeric
//! strings alike. Records missing their ID are dropped with a warning
//! rather than failing the whole response.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use shopfront_core::{
    AddressId, BrandId, CartId, CategoryId, Email, LineId, OrderId, PaymentMethod, Price,
    ProductId, UserId,
};

use super::ApiError;
use super::types::{
    RawAddress, RawAuthResponse, RawCartItem, RawCartResponse, RawNamed, RawOrder,
    RawProduct, RawProductPage, RawShippingAddress,
};
use crate::models::{
    Address, Brand, CartLineItem, CartSummary, Category, Credential, Order, OrderItem, Page,
    Product, Session, SessionUser, ShippingAddress,
};

// =============================================================================
// Scalars
// =============================================================================

/// Interpret a JSON number or numeric string as a decimal.
fn decimal(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(number) => number.to_string().parse().ok(),
        Value::String(text) if !text.trim().is_empty() => text.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a JSON number or numeric string as a non-negative integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn price(value: Option<&Value>) -> Option<Price> {
    decimal(value).map(Price::new)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// =============================================================================
// Session
// =============================================================================

/// Build a session from a sign-in, sign-up or password-reset response.
///
/// The user ID comes from `user._id`, falling back to the `id` claim of the
/// issued token; `email` is used when the response omits the user's email.
pub fn session(raw: RawAuthResponse, email: &Email) -> Result<Session, ApiError> {
    let token = non_empty(raw.token)
        .ok_or_else(|| ApiError::Malformed("response carries no token".to_string()))?;
    let credential = Credential::new(token);

    let (raw_id, raw_name, raw_email) = raw
        .user
        .map_or((None, None, None), |user| (user.id, user.name, user.email));

    let id = non_empty(raw_id)
        .map(UserId::new)
        .or_else(|| credential.user_id_claim())
        .ok_or_else(|| ApiError::Malformed("cannot determine user id".to_string()))?;

    let name = non_empty(raw_name)
        .or_else(|| credential.name_claim())
        .unwrap_or_default();

    let email = raw_email
        .and_then(|e| Email::parse(&e).ok())
        .unwrap_or_else(|| email.clone());

    Ok(Session {
        credential,
        user: SessionUser { id, name, email },
    })
}

// =============================================================================
// Cart
// =============================================================================

/// One cart or order line, shared by the cart and order conversions.
fn line(raw: RawCartItem) -> Option<CartLineItem> {
    let product_ref = raw.product.as_ref();
    let Some(product_id) = product_ref
        .and_then(|p| p.id())
        .filter(|id| !id.trim().is_empty())
    else {
        tracing::warn!(line_id = ?raw.id, "Dropping cart line without product id");
        return None;
    };
    let product_id = ProductId::new(product_id);
    let populated = product_ref.and_then(|p| p.populated());

    let unit_price = price(raw.price.as_ref())
        .or_else(|| populated.and_then(|p| price(p.price.as_ref())))
        .unwrap_or(Price::ZERO);

    Some(CartLineItem {
        line_id: non_empty(raw.id).map_or_else(|| LineId::new(product_id.as_str()), LineId::new),
        title: populated
            .and_then(|p| p.title.clone())
            .unwrap_or_default(),
        image_ref: populated.and_then(|p| non_empty(p.image_cover.clone())),
        category: populated
            .and_then(|p| p.category.as_ref())
            .and_then(|c| non_empty(c.name.clone())),
        brand: populated
            .and_then(|p| p.brand.as_ref())
            .and_then(|b| non_empty(b.name.clone())),
        unit_price,
        quantity: whole(raw.count.as_ref()).unwrap_or(0),
        product_id,
    })
}

/// Normalize a GET `/cart` response.
///
/// `item_count` is taken from `numOfCartItems` only when the server sends a
/// JSON number; `subtotal` from `totalCartPrice` when it is a number or a
/// numeric string. Otherwise both are recomputed from the lines.
///
/// # Errors
///
/// Returns `ApiError::Malformed` when recomputing a total overflows.
pub fn cart_summary(raw: RawCartResponse) -> Result<CartSummary, ApiError> {
    let cart = raw.data.unwrap_or_default();

    let mut summary = CartSummary {
        cart_id: non_empty(cart.id).or_else(|| non_empty(raw.cart_id)).map(CartId::new),
        items: cart.products.into_iter().filter_map(line).collect(),
        ..CartSummary::empty()
    };

    summary.item_count = match raw.num_of_cart_items.as_ref() {
        Some(value @ Value::Number(_)) => whole(Some(value)),
        _ => None,
    }
    .or_else(|| summary.checked_item_count())
    .ok_or_else(|| ApiError::Malformed("cart item count out of range".to_string()))?;

    summary.subtotal = price(cart.total_cart_price.as_ref())
        .or_else(|| summary.checked_subtotal())
        .ok_or_else(|| ApiError::Malformed("cart subtotal out of range".to_string()))?;

    Ok(summary)
}

// =============================================================================
// Catalog
// =============================================================================

fn category(raw: RawNamed) -> Option<Category> {
    let id = non_empty(raw.id)?;
    Some(Category {
        id: CategoryId::new(id),
        name: raw.name.unwrap_or_default(),
        slug: non_empty(raw.slug),
        image: non_empty(raw.image),
    })
}

fn brand(raw: RawNamed) -> Option<Brand> {
    let id = non_empty(raw.id)?;
    Some(Brand {
        id: BrandId::new(id),
        name: raw.name.unwrap_or_default(),
        slug: non_empty(raw.slug),
        image: non_empty(raw.image),
    })
}

pub fn categories(raw: Vec<RawNamed>) -> Vec<Category> {
    raw.into_iter().filter_map(category).collect()
}

pub fn brands(raw: Vec<RawNamed>) -> Vec<Brand> {
    raw.into_iter().filter_map(brand).collect()
}

pub fn product(raw: RawProduct) -> Option<Product> {
    let Some(id) = non_empty(raw.id) else {
        tracing::warn!(title = ?raw.title, "Dropping product without id");
        return None;
    };

    Some(Product {
        id: ProductId::new(id),
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        price: price(raw.price.as_ref()).unwrap_or(Price::ZERO),
        price_after_discount: price(raw.price_after_discount.as_ref()),
        image_cover: non_empty(raw.image_cover),
        images: raw.images,
        category: raw.category.and_then(category),
        brand: raw.brand.and_then(brand),
        ratings_average: raw
            .ratings_average
            .as_ref()
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        ratings_quantity: whole(raw.ratings_quantity.as_ref()).unwrap_or(0),
        quantity: whole(raw.quantity.as_ref()).unwrap_or(0),
        sold: whole(raw.sold.as_ref()).unwrap_or(0),
    })
}

/// Normalize a product listing; missing metadata falls back to the request.
pub fn product_page(raw: RawProductPage, page: u32, limit: u32) -> Page<Product> {
    let metadata = raw.metadata.unwrap_or_default();
    let page = whole(metadata.current_page.as_ref()).unwrap_or(page).max(1);
    Page {
        items: raw.data.into_iter().filter_map(product).collect(),
        page,
        total_pages: whole(metadata.number_of_pages.as_ref()).unwrap_or(page),
        limit: whole(metadata.limit.as_ref()).unwrap_or(limit),
    }
}

// =============================================================================
// Addresses & Orders
// =============================================================================

pub fn address(raw: RawAddress) -> Option<Address> {
    let Some(id) = non_empty(raw.id) else {
        tracing::warn!("Dropping address without id");
        return None;
    };
    Some(Address {
        id: AddressId::new(id),
        name: raw.name.unwrap_or_default(),
        details: raw.details.unwrap_or_default(),
        phone: raw.phone.unwrap_or_default(),
        city: raw.city.unwrap_or_default(),
    })
}

fn shipping_address(raw: RawShippingAddress) -> ShippingAddress {
    ShippingAddress {
        details: raw.details.unwrap_or_default(),
        phone: raw.phone.unwrap_or_default(),
        city: raw.city.unwrap_or_default(),
    }
}

pub fn shipping_request(address: &ShippingAddress) -> RawShippingAddress {
    RawShippingAddress {
        details: Some(address.details.clone()),
        phone: Some(address.phone.clone()),
        city: Some(address.city.clone()),
    }
}

fn payment_method(raw: Option<&str>) -> PaymentMethod {
    raw.map(str::to_ascii_lowercase)
        .and_then(|method| serde_json::from_value(Value::String(method)).ok())
        .unwrap_or(PaymentMethod::Other)
}

pub fn order(raw: RawOrder) -> Option<Order> {
    let Some(id) = non_empty(raw.object_id) else {
        tracing::warn!(number = ?raw.id, "Dropping order without id");
        return None;
    };

    let items: Vec<OrderItem> = raw
        .cart_items
        .into_iter()
        .filter_map(line)
        .map(|line| OrderItem {
            product_id: line.product_id,
            title: line.title,
            image_ref: line.image_ref,
            unit_price: line.unit_price,
            quantity: line.quantity,
        })
        .collect();

    // Saturating: an order history entry is display-only.
    let total = price(raw.total_order_price.as_ref()).unwrap_or_else(|| {
        items
            .iter()
            .map(|item| item.unit_price.times(item.quantity))
            .sum()
    });

    Some(Order {
        id: OrderId::new(id),
        number: raw.id.as_ref().and_then(Value::as_u64),
        items,
        total,
        payment_method: payment_method(raw.payment_method_type.as_deref()),
        is_paid: raw.is_paid,
        is_delivered: raw.is_delivered,
        shipping_address: raw.shipping_address.map(shipping_address),
        created_at: raw
            .created_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
            .map(|at| at.with_timezone(&Utc)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_cart_summary_uses_server_totals() {
        let raw: RawCartResponse = parse(
            r#"{
                "status": "success",
                "numOfCartItems": 3,
                "cartId": "c1",
                "data": {
                    "_id": "c1",
                    "products": [
                        {"_id": "l1", "count": 2, "price": 10,
                         "product": {"_id": "p1", "title": "Tee", "imageCover": "tee.jpg",
                                     "category": {"name": "Men's Fashion"}, "brand": {"name": "Acme"}}},
                        {"_id": "l2", "count": 1, "price": 5, "product": {"_id": "p2", "title": "Socks"}}
                    ],
                    "totalCartPrice": 25
                }
            }"#,
        );
        let cart = cart_summary(raw).unwrap();
        assert_eq!(cart.cart_id, Some(CartId::new("c1")));
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal.to_string(), "25.00");

        let first = &cart.items[0];
        assert_eq!(first.line_id, LineId::new("l1"));
        assert_eq!(first.product_id, ProductId::new("p1"));
        assert_eq!(first.title, "Tee");
        assert_eq!(first.image_ref.as_deref(), Some("tee.jpg"));
        assert_eq!(first.category.as_deref(), Some("Men's Fashion"));
        assert_eq!(first.brand.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_cart_summary_recomputes_missing_totals() {
        let raw: RawCartResponse = parse(
            r#"{"data": {"products": [
                {"_id": "l1", "count": 2, "price": 10, "product": {"_id": "p1"}}
            ]}}"#,
        );
        let cart = cart_summary(raw).unwrap();
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.subtotal.to_string(), "20.00");
    }

    #[test]
    fn test_cart_summary_numeric_string_total() {
        let raw: RawCartResponse = parse(
            r#"{"numOfCartItems": "7", "data": {"products": [
                {"_id": "l1", "count": 2, "price": 10, "product": "p1"}
            ], "totalCartPrice": "19.5"}}"#,
        );
        let cart = cart_summary(raw).unwrap();
        // A string count is not trusted; the lines are summed instead.
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.subtotal.to_string(), "19.50");
    }

    #[test]
    fn test_cart_summary_drops_lines_without_product() {
        let raw: RawCartResponse = parse(
            r#"{"data": {"products": [
                {"_id": "l1", "count": 1, "price": 10},
                {"_id": "l2", "count": 1, "price": 4, "product": {"title": "Ghost"}},
                {"_id": "l3", "count": 1, "price": 3, "product": "p3"}
            ]}}"#,
        );
        let cart = cart_summary(raw).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, ProductId::new("p3"));
        assert_eq!(cart.subtotal, Price::from_units(3));
    }

    #[test]
    fn test_cart_summary_empty_payload() {
        let cart = cart_summary(parse(r#"{"status": "success"}"#)).unwrap();
        assert_eq!(cart, CartSummary::empty());
    }

    #[test]
    fn test_cart_summary_count_overflow_is_malformed() {
        let raw: RawCartResponse = parse(
            r#"{"data": {"products": [
                {"_id": "l1", "count": 4000000000, "price": 1, "product": "p1"},
                {"_id": "l2", "count": 4000000000, "price": 1, "product": "p2"}
            ], "totalCartPrice": 8}}"#,
        );
        assert!(matches!(cart_summary(raw), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_cart_summary_price_overflow_is_malformed() {
        let raw: RawCartResponse = parse(
            r#"{"numOfCartItems": 2, "data": {"products": [
                {"_id": "l1", "count": 2, "price": "79228162514264337593543950335", "product": "p1"}
            ]}}"#,
        );
        assert!(matches!(cart_summary(raw), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_cart_summary_server_totals_skip_recomputation() {
        // Lines that would overflow are fine when the server sends totals.
        let raw: RawCartResponse = parse(
            r#"{"numOfCartItems": 2, "data": {"products": [
                {"_id": "l1", "count": 2, "price": "79228162514264337593543950335", "product": "p1"}
            ], "totalCartPrice": 5}}"#,
        );
        let cart = cart_summary(raw).unwrap();
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.subtotal, Price::from_units(5));
    }

    #[test]
    fn test_session_from_sign_in() {
        let raw: RawAuthResponse = parse(
            r#"{"message": "success", "token": "tok",
                "user": {"_id": "u1", "name": "Mona", "email": "mona@example.com"}}"#,
        );
        let session = session(raw, &Email::parse("other@example.com").unwrap()).unwrap();
        assert_eq!(session.credential.expose_secret(), "tok");
        assert_eq!(session.user.id, UserId::new("u1"));
        assert_eq!(session.user.name, "Mona");
        assert_eq!(session.user.email.as_str(), "mona@example.com");
    }

    #[test]
    fn test_session_requires_identifiable_user() {
        let email = Email::parse("mona@example.com").unwrap();
        let raw: RawAuthResponse = parse(r#"{"message": "success", "token": "opaque"}"#);
        assert!(matches!(session(raw, &email), Err(ApiError::Malformed(_))));

        let raw: RawAuthResponse = parse(r#"{"message": "success"}"#);
        assert!(matches!(session(raw, &email), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn test_product_page_metadata() {
        let raw: RawProductPage = parse(
            r#"{"metadata": {"currentPage": 2, "numberOfPages": 3, "limit": 40},
                "data": [{"_id": "p1", "title": "Tee", "price": 149, "priceAfterDiscount": 99,
                          "ratingsAverage": 4.8, "ratingsQuantity": 12, "quantity": 5, "sold": 100,
                          "category": {"_id": "c1", "name": "Men"}}, {"title": "no id"}]}"#,
        );
        let page = product_page(raw, 1, 20);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.limit, 40);
        assert_eq!(page.items.len(), 1);
        let product = &page.items[0];
        assert_eq!(product.effective_price(), Price::from_units(99));
        assert_eq!(product.category.as_ref().map(|c| c.name.as_str()), Some("Men"));
        assert!((product.ratings_average - 4.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_conversion() {
        let raw: RawOrder = parse(
            r#"{"_id": "o1", "id": 42, "totalOrderPrice": 30, "paymentMethodType": "cash",
                "isPaid": false, "isDelivered": false,
                "shippingAddress": {"details": "12 Nile St", "phone": "01012345678", "city": "Cairo"},
                "cartItems": [{"_id": "l1", "count": 3, "price": 10, "product": {"_id": "p1", "title": "Tee"}}],
                "createdAt": "2024-03-01T10:00:00.000Z"}"#,
        );
        let order = order(raw).unwrap();
        assert_eq!(order.number, Some(42));
        assert_eq!(order.total, Price::from_units(30));
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.unit_count(), 3);
        assert_eq!(order.shipping_address.unwrap().city, "Cairo");
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_payment_method_unknown() {
        assert_eq!(payment_method(Some("Wallet")), PaymentMethod::Other);
        assert_eq!(payment_method(Some("Card")), PaymentMethod::Card);
        assert_eq!(payment_method(None), PaymentMethod::Other);
    }
}
