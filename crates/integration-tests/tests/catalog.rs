//! Integration tests for catalog reads and their cache.
//!
//! Run with: cargo test -p shopfront-integration-tests

use axum::http::Method;
use shopfront_client::ApiError;
use shopfront_client::api::SEARCH_PAGE_SIZE;
use shopfront_client::models::{Product, ProductFilter};
use shopfront_core::{Price, ProductId};
use shopfront_integration_tests::{FakeApi, SCARF, SHIRT, TEE};

#[tokio::test]
async fn test_product_pages() {
    let fake = FakeApi::start().await;
    let api = fake.storefront().api().clone();

    let first = api.list_products(1, 2).await.expect("page 1");
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 2);
    assert!(first.has_next());
    assert!(!first.has_previous());

    let second = api.list_products(2, 2).await.expect("page 2");
    assert_eq!(second.items.len(), 1);
    assert!(!second.has_next());
    assert!(second.has_previous());
}

#[tokio::test]
async fn test_product_detail() {
    let fake = FakeApi::start().await;
    let api = fake.storefront().api().clone();

    let shirt = api.get_product(&ProductId::new(SHIRT)).await.expect("shirt");
    assert_eq!(shirt.title, "Linen Shirt");
    assert_eq!(shirt.price, Price::from_units(25));
    assert_eq!(shirt.effective_price(), Price::from_units(20));
    assert_eq!(shirt.brand.map(|brand| brand.name).as_deref(), Some("Delta"));
    assert_eq!(
        shirt.category.map(|category| category.name).as_deref(),
        Some("Men's Fashion")
    );

    let scarf = api.get_product(&ProductId::new(SCARF)).await.expect("scarf");
    assert!(!scarf.in_stock());
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let fake = FakeApi::start().await;
    let api = fake.storefront().api().clone();

    let err = api
        .get_product(&ProductId::new("000000000000000000000000"))
        .await
        .expect_err("unknown product");
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_catalog_reads_are_cached() {
    let fake = FakeApi::start().await;
    let api = fake.storefront().api().clone();
    let shirt = ProductId::new(SHIRT);
    let path = format!("/products/{SHIRT}");

    api.get_product(&shirt).await.expect("first read");
    api.get_product(&shirt).await.expect("cached read");
    assert_eq!(fake.request_count(&Method::GET, &path), 1);

    let categories = api.list_categories().await.expect("categories");
    assert_eq!(categories.len(), 2);
    api.list_categories().await.expect("cached categories");
    assert_eq!(fake.request_count(&Method::GET, "/categories"), 1);

    let brands = api.list_brands().await.expect("brands");
    assert_eq!(brands.len(), 2);

    api.invalidate_catalog_cache();
    api.get_product(&shirt).await.expect("read after invalidation");
    assert_eq!(fake.request_count(&Method::GET, &path), 2);
}

#[tokio::test]
async fn test_catalog_needs_no_session() {
    let fake = FakeApi::start().await;
    let storefront = fake.storefront();
    storefront.restore(None);

    let page = storefront
        .api()
        .list_products(1, 20)
        .await
        .expect("products while signed out");
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn test_search_by_query_category_and_brand() {
    let fake = FakeApi::start().await;
    let api = fake.storefront().api().clone();
    let ids = |products: Vec<Product>| {
        products
            .into_iter()
            .map(|product| product.id.as_str().to_string())
            .collect::<Vec<_>>()
    };

    // Brand names are searched too
    let by_query = ProductFilter {
        query: "NILE".to_string(),
        ..ProductFilter::default()
    };
    let found = api.search_products(&by_query, SEARCH_PAGE_SIZE).await.expect("search");
    assert_eq!(ids(found), vec![TEE.to_string(), SCARF.to_string()]);

    let mens_nile = ProductFilter {
        category: Some("men's fashion".to_string()),
        brand: Some("Nile".to_string()),
        ..ProductFilter::default()
    };
    let found = api.search_products(&mens_nile, SEARCH_PAGE_SIZE).await.expect("search");
    assert_eq!(ids(found), vec![TEE.to_string()]);

    let nothing = ProductFilter {
        query: "linen".to_string(),
        brand: Some("Nile".to_string()),
        ..ProductFilter::default()
    };
    assert!(api.search_products(&nothing, SEARCH_PAGE_SIZE).await.expect("search").is_empty());
}

#[tokio::test]
async fn test_search_walks_every_page() {
    let fake = FakeApi::start().await;
    let api = fake.storefront().api().clone();

    let all = api
        .search_products(&ProductFilter::default(), 1)
        .await
        .expect("search");
    assert_eq!(all.len(), 3);
    assert_eq!(fake.request_count(&Method::GET, "/products"), 3);

    // Pages come from the cache the second time
    api.search_products(&ProductFilter::default(), 1)
        .await
        .expect("cached search");
    assert_eq!(fake.request_count(&Method::GET, "/products"), 3);
}
