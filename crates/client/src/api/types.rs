//! Raw wire types for the remote store API.
//!
//! The remote API is loosely typed: numbers sometimes arrive as strings,
//! fields go missing, and a cart line's `product` is a populated object on
//! reads but a bare ID in mutation responses. Every field here is therefore
//! optional or defaulted, and numeric fields are kept as `serde_json::Value`
//! until [`super::conversions`] interprets them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Envelope
// =============================================================================

/// Common response wrapper: `status` / `message` plus a `data` payload.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "statusMsg")]
    pub status_msg: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the server reported success: `status` or `message` is
    /// exactly `"success"`.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success") || self.message.as_deref() == Some("success")
    }
}

/// Error body returned with non-success HTTP statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<ErrorDetail>,
}

/// Validation detail attached to some error bodies.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub msg: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub re_password: &'a str,
    pub phone: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResetCodeRequest<'a> {
    pub reset_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub new_password: &'a str,
}

/// Response of sign-in, sign-up and password reset.
#[derive(Debug, Deserialize)]
pub struct RawAuthResponse {
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A category or brand reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNamed {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub price_after_discount: Option<Value>,
    pub image_cover: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Option<RawNamed>,
    pub brand: Option<RawNamed>,
    pub ratings_average: Option<Value>,
    pub ratings_quantity: Option<Value>,
    pub quantity: Option<Value>,
    pub sold: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageMetadata {
    pub current_page: Option<Value>,
    pub number_of_pages: Option<Value>,
    pub limit: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawProductPage {
    pub metadata: Option<RawPageMetadata>,
    #[serde(default)]
    pub data: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
pub struct RawList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line's product: populated on reads, a bare ID after mutations.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawProductRef {
    Populated(Box<RawProduct>),
    Id(String),
}

impl RawProductRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Populated(product) => product.id.as_deref(),
            Self::Id(id) => Some(id),
        }
    }

    pub fn populated(&self) -> Option<&RawProduct> {
        match self {
            Self::Populated(product) => Some(product),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCartItem {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub count: Option<Value>,
    pub price: Option<Value>,
    pub product: Option<RawProductRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCart {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub products: Vec<RawCartItem>,
    pub total_cart_price: Option<Value>,
}

/// GET `/cart` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCartResponse {
    pub num_of_cart_items: Option<Value>,
    pub cart_id: Option<String>,
    pub data: Option<RawCart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdRequest<'a> {
    pub product_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CountRequest {
    pub count: u32,
}

// =============================================================================
// Addresses & Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RawAddress {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub details: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddressRequest<'a> {
    pub name: &'a str,
    pub details: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RawShippingAddress {
    pub details: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOrderRequest {
    pub shipping_address: RawShippingAddress,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(rename = "_id")]
    pub object_id: Option<String>,
    /// Short numeric order number.
    pub id: Option<Value>,
    pub total_order_price: Option<Value>,
    pub payment_method_type: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub cart_items: Vec<RawCartItem>,
    pub shipping_address: Option<RawShippingAddress>,
    pub created_at: Option<String>,
}

/// GET `/orders/user/{id}` returns either a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawOrderList {
    Bare(Vec<RawOrder>),
    Wrapped(RawList<RawOrder>),
}

impl RawOrderList {
    pub fn into_vec(self) -> Vec<RawOrder> {
        match self {
            Self::Bare(orders) => orders,
            Self::Wrapped(list) => list.data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_variants() {
        let ok: Envelope<Value> = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.is_success());
        let ok: Envelope<Value> = serde_json::from_str(r#"{"message":"success"}"#).unwrap();
        assert!(ok.is_success());
        let fail: Envelope<Value> = serde_json::from_str(r#"{"status":"Success"}"#).unwrap();
        assert!(!fail.is_success());
        let fail: Envelope<Value> = serde_json::from_str(r#"{"statusMsg":"success"}"#).unwrap();
        assert!(!fail.is_success());
        let fail: Envelope<Value> =
            serde_json::from_str(r#"{"statusMsg":"fail","message":"Invalid ID"}"#).unwrap();
        assert!(!fail.is_success());
    }

    #[test]
    fn test_product_ref_untagged() {
        let item: RawCartItem =
            serde_json::from_str(r#"{"_id":"l1","count":1,"price":10,"product":"p1"}"#).unwrap();
        assert_eq!(item.product.as_ref().and_then(RawProductRef::id), Some("p1"));

        let item: RawCartItem = serde_json::from_str(
            r#"{"_id":"l1","count":1,"price":10,"product":{"_id":"p1","title":"Tee"}}"#,
        )
        .unwrap();
        let product = item.product.unwrap();
        assert_eq!(product.id(), Some("p1"));
        assert!(product.populated().is_some());
    }

    #[test]
    fn test_order_list_shapes() {
        let bare: RawOrderList = serde_json::from_str(r#"[{"_id":"o1"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);
        let wrapped: RawOrderList =
            serde_json::from_str(r#"{"data":[{"_id":"o1"},{"_id":"o2"}]}"#).unwrap();
        assert_eq!(wrapped.into_vec().len(), 2);
    }
}
