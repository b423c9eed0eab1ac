//! Integration tests for the cart synchronizer.
//!
//! Each test starts its own fake store API on an ephemeral port.
//!
//! Run with: cargo test -p shopfront-integration-tests

#![allow(clippy::indexing_slicing)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use secrecy::SecretString;
use shopfront_client::{NotificationKind, StoreError, Storefront};
use shopfront_core::{Email, Price, ProductId, Quantity};
use shopfront_integration_tests::{
    FakeApi, SHIRT, SHOPPER_EMAIL, SHOPPER_ID, SHOPPER_PASSWORD, TEE, drain,
};

/// Storefront restored to the seeded shopper, without the session follower.
async fn signed_in() -> (FakeApi, Storefront) {
    let fake = FakeApi::start().await;
    let storefront = fake.storefront();
    storefront.restore(Some(fake.session_for(SHOPPER_EMAIL)));
    (fake, storefront)
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn test_add_item_inserts_then_increments() {
    let (fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);

    let summary = cart.add_item(&tee).await.expect("first add");
    assert_eq!(summary.quantity_of(&tee), 1);

    let summary = cart.add_item(&tee).await.expect("second add");
    assert_eq!(summary.quantity_of(&tee), 2);
    assert_eq!(cart.snapshot(), summary);
    assert_eq!(fake.server_quantity(SHOPPER_ID, TEE), 2);

    // Every mutation is followed by a full re-fetch
    assert_eq!(fake.request_count(&Method::POST, "/cart"), 2);
    assert_eq!(fake.request_count(&Method::GET, "/cart"), 2);
}

#[tokio::test]
async fn test_subtotal_from_line_prices() {
    let (_fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);

    cart.add_item(&tee).await.expect("add");
    let summary = cart
        .update_quantity(&tee, Quantity::clamped(2))
        .await
        .expect("update");

    let line = summary.line(&tee).expect("line for tee");
    assert_eq!(line.quantity, 2);
    assert_eq!(line.unit_price, Price::from_units(10));
    assert_eq!(summary.subtotal.to_string(), "20.00");
    assert_eq!(summary.subtotal, summary.computed_subtotal());
}

#[tokio::test]
async fn test_discounted_unit_price() {
    let (_fake, storefront) = signed_in().await;
    let shirt = ProductId::new(SHIRT);

    let summary = storefront.cart().add_item(&shirt).await.expect("add");
    let line = summary.line(&shirt).expect("line for shirt");
    assert_eq!(line.unit_price, Price::from_units(20));
    assert_eq!(line.title, "Linen Shirt");
    assert_eq!(line.brand.as_deref(), Some("Delta"));
}

#[tokio::test]
async fn test_remove_last_item_empties_cart() {
    let (_fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);

    cart.add_item(&tee).await.expect("add");
    cart.add_item(&tee).await.expect("add again");

    let summary = cart.remove_item(&tee).await.expect("remove");
    assert!(summary.is_empty());
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.subtotal.to_string(), "0.00");
    assert!(summary.cart_id.is_some());
}

#[tokio::test]
async fn test_update_quantity_sends_clamped_count() {
    let (fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);

    cart.add_item(&tee).await.expect("add");
    cart.update_quantity(&tee, Quantity::clamped(5))
        .await
        .expect("raise");
    assert_eq!(fake.server_quantity(SHOPPER_ID, TEE), 5);

    let summary = cart
        .update_quantity(&tee, Quantity::clamped(-3))
        .await
        .expect("lower");
    assert_eq!(summary.quantity_of(&tee), 1);
    assert_eq!(fake.server_quantity(SHOPPER_ID, TEE), 1);
}

#[tokio::test]
async fn test_rejected_mutation_keeps_state() {
    let (fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);
    cart.add_item(&tee).await.expect("add");
    let before = cart.snapshot();
    let reads_before = fake.request_count(&Method::GET, "/cart");

    let mut notifications = storefront.notifier().subscribe();
    let err = cart
        .add_item(&ProductId::new("000000000000000000000000"))
        .await
        .expect_err("unknown product");
    assert!(matches!(err, StoreError::Api(_)));

    assert_eq!(cart.snapshot(), before);
    // No refresh after a failed mutation
    assert_eq!(fake.request_count(&Method::GET, "/cart"), reads_before);

    let received = drain(&mut notifications);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, NotificationKind::Error);
    assert_eq!(received[0].message, "No product for this id");
}

#[tokio::test]
async fn test_server_error_without_message_uses_fallback() {
    let (fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);
    cart.add_item(&tee).await.expect("add");

    fake.fail_next(
        Method::DELETE,
        &format!("/cart/{TEE}"),
        StatusCode::INTERNAL_SERVER_ERROR,
        "",
    );
    let mut notifications = storefront.notifier().subscribe();
    cart.remove_item(&tee).await.expect_err("server error");

    let received = drain(&mut notifications);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message, "Failed to remove item");
    assert_eq!(cart.snapshot().quantity_of(&tee), 1);
}

// ============================================================================
// Signed out
// ============================================================================

#[tokio::test]
async fn test_signed_out_mutations_make_no_requests() {
    let fake = FakeApi::start().await;
    let storefront = fake.storefront();
    storefront.restore(None);
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);
    let mut notifications = storefront.notifier().subscribe();

    assert!(matches!(
        cart.add_item(&tee).await,
        Err(StoreError::Unauthenticated)
    ));
    assert!(matches!(
        cart.update_quantity(&tee, Quantity::clamped(2)).await,
        Err(StoreError::Unauthenticated)
    ));
    assert!(matches!(
        cart.remove_item(&tee).await,
        Err(StoreError::Unauthenticated)
    ));

    let received = drain(&mut notifications);
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|n| n.kind == NotificationKind::Error));
    assert_eq!(received[0].message, "Please sign in to add items to cart");

    // A signed-out refresh quietly resolves to the empty cart
    let summary = cart.refresh().await.expect("refresh");
    assert!(summary.is_empty());
    assert!(drain(&mut notifications).is_empty());

    assert!(fake.requests().is_empty());
}

// ============================================================================
// Refresh failures and ordering
// ============================================================================

#[tokio::test]
async fn test_unauthorized_refresh_keeps_state_and_notifies_once() {
    let (fake, storefront) = signed_in().await;
    let cart = storefront.cart();
    let tee = ProductId::new(TEE);
    cart.add_item(&tee).await.expect("add");
    let before = cart.snapshot();

    fake.revoke_tokens();
    let mut notifications = storefront.notifier().subscribe();
    let err = cart.refresh().await.expect_err("revoked token");
    assert!(err.is_unauthorized());

    assert_eq!(cart.snapshot(), before);
    assert!(!cart.is_loading());

    let received = drain(&mut notifications);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, NotificationKind::Error);
    assert_eq!(received[0].message, "Invalid Token. please login again");
}

#[tokio::test]
async fn test_stale_refresh_is_discarded() {
    let (fake, storefront) = signed_in().await;
    let tee = ProductId::new(TEE);

    // The first read sees the empty cart but answers last
    let gate = fake.gate_next_cart_read();
    let cart = storefront.cart().clone();
    let slow = tokio::spawn(async move { cart.refresh().await });
    fake.wait_for_requests(&Method::GET, "/cart", 1).await;
    assert!(storefront.cart().is_loading());

    fake.add_to_server_cart(SHOPPER_ID, TEE, 3);
    let fresh = storefront.cart().refresh().await.expect("fresh refresh");
    assert_eq!(fresh.quantity_of(&tee), 3);

    gate.notify_one();
    let stale = slow.await.expect("task").expect("stale refresh");

    // The late response is dropped and the caller sees the current snapshot
    assert_eq!(stale.quantity_of(&tee), 3);
    assert_eq!(storefront.cart().snapshot().quantity_of(&tee), 3);
    assert!(!storefront.cart().is_loading());
}

#[tokio::test]
async fn test_response_from_previous_session_is_discarded() {
    let (fake, storefront) = signed_in().await;
    fake.add_to_server_cart(SHOPPER_ID, TEE, 2);

    let gate = fake.gate_next_cart_read();
    let cart = storefront.cart().clone();
    let in_flight = tokio::spawn(async move { cart.refresh().await });
    fake.wait_for_requests(&Method::GET, "/cart", 1).await;

    let mut notifications = storefront.notifier().subscribe();
    storefront.sign_out();
    gate.notify_one();

    let summary = in_flight.await.expect("task").expect("refresh");
    assert!(summary.is_empty());
    assert!(storefront.cart().snapshot().is_empty());

    let received = drain(&mut notifications);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message, "Signed out");
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[tokio::test]
async fn test_cart_follows_session() {
    let fake = FakeApi::start().await;
    fake.add_to_server_cart(SHOPPER_ID, TEE, 2);
    let storefront = fake.storefront();
    let tee = ProductId::new(TEE);
    let mut states = storefront.cart().subscribe();

    storefront.start(Some(fake.session_for(SHOPPER_EMAIL)));
    tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|state| state.summary.quantity_of(&tee) == 2),
    )
    .await
    .expect("cart loaded after start")
    .expect("cart state channel open");

    storefront.sign_out();
    assert!(storefront.cart().snapshot().is_empty());

    let email = Email::parse(SHOPPER_EMAIL).expect("email");
    let password = SecretString::from(SHOPPER_PASSWORD);
    storefront
        .session()
        .sign_in(&email, &password)
        .await
        .expect("sign in");

    tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(|state| state.summary.quantity_of(&tee) == 2),
    )
    .await
    .expect("cart reloaded after sign in")
    .expect("cart state channel open");
}
