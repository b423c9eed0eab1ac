//! Catalog commands. These need no session.

use shopfront_client::api::SEARCH_PAGE_SIZE;
use shopfront_client::models::ProductFilter;
use shopfront_core::ProductId;

use super::{CliError, Context};
use crate::output;

/// List one page of products, or search the whole catalog when `filter`
/// sets any criterion.
pub async fn products(
    ctx: &Context,
    page: u32,
    limit: u32,
    filter: &ProductFilter,
) -> Result<(), CliError> {
    if !filter.is_empty() {
        let matches = ctx
            .storefront()
            .api()
            .search_products(filter, SEARCH_PAGE_SIZE)
            .await?;
        output::print_products(&matches);
        output::print_line(&output::render_match_count(matches.len()));
        return Ok(());
    }

    let page = ctx.storefront().api().list_products(page, limit).await?;
    output::print_products(&page.items);
    output::print_line(&format!("Page {} of {}", page.page, page.total_pages));
    Ok(())
}

pub async fn product(ctx: &Context, id: String) -> Result<(), CliError> {
    let product = ctx
        .storefront()
        .api()
        .get_product(&ProductId::new(id))
        .await?;
    output::print_product_detail(&product);
    Ok(())
}

pub async fn categories(ctx: &Context) -> Result<(), CliError> {
    let categories = ctx.storefront().api().list_categories().await?;
    for category in &categories {
        output::print_line(&format!("{}  {}", category.id, category.name));
    }
    Ok(())
}

pub async fn brands(ctx: &Context) -> Result<(), CliError> {
    let brands = ctx.storefront().api().list_brands().await?;
    for brand in &brands {
        output::print_line(&format!("{}  {}", brand.id, brand.name));
    }
    Ok(())
}
