//! Catalog types: products, categories, brands.

use serde::{Deserialize, Serialize};

use shopfront_core::{BrandId, CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Option<String>,
    pub image: Option<String>,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: Option<String>,
    pub image: Option<String>,
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// List price.
    pub price: Price,
    /// Sale price, when the product is discounted.
    pub price_after_discount: Option<Price>,
    /// Cover image URL.
    pub image_cover: Option<String>,
    /// Gallery image URLs.
    pub images: Vec<String>,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
    pub ratings_average: f64,
    pub ratings_quantity: u32,
    /// Units in stock.
    pub quantity: u32,
    /// Units sold.
    pub sold: u32,
}

impl Product {
    /// The price a shopper pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.price_after_discount
            .filter(|sale| *sale < self.price)
            .unwrap_or(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Client-side product search, as offered by the shop page.
///
/// `query` matches a case-insensitive substring of the title, description
/// or brand name; an empty query matches everything. `category` and `brand`
/// match the respective name exactly, ignoring case. All given criteria must
/// hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub query: String,
    pub category: Option<String>,
    pub brand: Option<String>,
}

impl ProductFilter {
    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.category.as_deref().is_none_or(str::is_empty)
            && self.brand.as_deref().is_none_or(str::is_empty)
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let brand_name = product
            .brand
            .as_ref()
            .map_or(String::new(), |brand| brand.name.to_lowercase());
        let category_name = product
            .category
            .as_ref()
            .map_or(String::new(), |category| category.name.to_lowercase());

        let query = self.query.to_lowercase();
        let matches_query = product.title.to_lowercase().contains(&query)
            || product.description.to_lowercase().contains(&query)
            || brand_name.contains(&query);

        matches_query
            && name_matches(self.category.as_deref(), &category_name)
            && name_matches(self.brand.as_deref(), &brand_name)
    }
}

/// An unset or empty `wanted` matches any name.
fn name_matches(wanted: Option<&str>, lowercase_name: &str) -> bool {
    wanted
        .filter(|wanted| !wanted.is_empty())
        .is_none_or(|wanted| wanted.to_lowercase() == lowercase_name)
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    pub total_pages: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, sale: Option<i64>) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Cotton Tee".to_string(),
            description: String::new(),
            price: Price::from_units(price),
            price_after_discount: sale.map(Price::from_units),
            image_cover: None,
            images: Vec::new(),
            category: None,
            brand: None,
            ratings_average: 4.5,
            ratings_quantity: 10,
            quantity: 0,
            sold: 3,
        }
    }

    #[test]
    fn test_effective_price_uses_lower_sale_price() {
        assert_eq!(product(100, Some(80)).effective_price(), Price::from_units(80));
        assert_eq!(product(100, None).effective_price(), Price::from_units(100));
        // A "sale" above list price is ignored.
        assert_eq!(product(100, Some(120)).effective_price(), Price::from_units(100));
    }

    #[test]
    fn test_in_stock() {
        assert!(!product(1, None).in_stock());
    }

    fn branded(title: &str, category: &str, brand: &str) -> Product {
        Product {
            title: title.to_string(),
            description: format!("{title} in assorted sizes"),
            category: Some(Category {
                id: CategoryId::new("c1"),
                name: category.to_string(),
                slug: None,
                image: None,
            }),
            brand: Some(Brand {
                id: BrandId::new("b1"),
                name: brand.to_string(),
                slug: None,
                image: None,
            }),
            ..product(10, None)
        }
    }

    #[test]
    fn test_filter_query_searches_title_description_and_brand() {
        let tee = branded("Cotton Tee", "Men's Fashion", "Nile");
        let by_query = |query: &str| ProductFilter {
            query: query.to_string(),
            ..ProductFilter::default()
        };

        assert!(by_query("").matches(&tee));
        assert!(by_query("cotton").matches(&tee));
        assert!(by_query("ASSORTED").matches(&tee));
        assert!(by_query("nil").matches(&tee));
        assert!(!by_query("linen").matches(&tee));
    }

    #[test]
    fn test_filter_category_and_brand_are_exact() {
        let tee = branded("Cotton Tee", "Men's Fashion", "Nile");
        let filter = ProductFilter {
            category: Some("men's fashion".to_string()),
            brand: Some("NILE".to_string()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&tee));

        let partial = ProductFilter {
            category: Some("Men".to_string()),
            ..ProductFilter::default()
        };
        assert!(!partial.matches(&tee));

        let unbranded = Product {
            brand: None,
            ..tee
        };
        assert!(!filter.matches(&unbranded));
    }

    #[test]
    fn test_filter_is_empty() {
        assert!(ProductFilter::default().is_empty());
        let filter = ProductFilter {
            brand: Some(String::new()),
            ..ProductFilter::default()
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&product(1, None)));
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::<()> {
            items: Vec::new(),
            page: 1,
            total_pages: 3,
            limit: 20,
        };
        assert!(page.has_next());
        assert!(!page.has_previous());
    }
}
