//! Public catalog endpoints. Responses are cached.

use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use shopfront_core::ProductId;

use super::cache::{CacheKey, CacheValue};
use super::types::{Envelope, RawList, RawNamed, RawProduct, RawProductPage};
use super::{ApiClient, ApiError, conversions};
use crate::models::{Brand, Category, Page, Product, ProductFilter};

/// Listing page size used when walking the whole catalog.
pub const SEARCH_PAGE_SIZE: u32 = 100;

impl ApiClient {
    /// Get one page of the product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u32, limit: u32) -> Result<Page<Product>, ApiError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let cache_key = CacheKey::Products { page, limit };

        // Check cache
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint(&["products"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.to_string());

        let raw: RawProductPage = self.send(self.request(Method::GET, url)).await?;
        let products = conversions::product_page(raw, page, limit);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Walk the whole product listing and keep what `filter` matches.
    ///
    /// Pages of `page_size` are fetched in order (each through the cache)
    /// until a short page or the last page. Matches keep listing order.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        filter: &ProductFilter,
        page_size: u32,
    ) -> Result<Vec<Product>, ApiError> {
        let page_size = page_size.max(1);
        let mut matches = Vec::new();
        let mut page_number = 1;
        let mut scanned = 0_usize;

        loop {
            let page = self.list_products(page_number, page_size).await?;
            let fetched = page.items.len();
            let has_next = page.has_next();
            scanned += fetched;
            matches.extend(page.items.into_iter().filter(|product| filter.matches(product)));

            if fetched < page_size as usize || !has_next {
                break;
            }
            page_number += 1;
        }

        debug!(scanned, matched = matches.len(), "Product search finished");
        Ok(matches)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(product_id.as_str().to_string());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", product_id.as_str()])?;
        let raw: Envelope<RawProduct> = match self.send(self.request(Method::GET, url)).await {
            Ok(raw) => raw,
            // Unknown and malformed IDs come back as 404 or 400
            Err(ApiError::Status { status, .. })
                if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST =>
            {
                return Err(ApiError::NotFound(format!("Product {product_id}")));
            }
            Err(e) => return Err(e),
        };

        let product = raw
            .data
            .and_then(conversions::product)
            .ok_or_else(|| ApiError::NotFound(format!("Product {product_id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint(&["categories"])?;
        let raw: RawList<RawNamed> = self.send(self.request(Method::GET, url)).await?;
        let categories = conversions::categories(raw.data);

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List all brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let url = self.endpoint(&["brands"])?;
        let raw: RawList<RawNamed> = self.send(self.request(Method::GET, url)).await?;
        let brands = conversions::brands(raw.data);

        self.inner
            .cache
            .insert(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }
}
