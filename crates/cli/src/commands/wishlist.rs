//! Wishlist commands.

use shopfront_core::ProductId;

use super::{CliError, Context};
use crate::output;

pub async fn show(ctx: &Context) -> Result<(), CliError> {
    let items = ctx.storefront().wishlist().refresh().await?;
    output::print_products(&items);
    Ok(())
}

pub async fn add(ctx: &Context, product: String) -> Result<(), CliError> {
    let items = ctx
        .storefront()
        .wishlist()
        .add(&ProductId::new(product))
        .await?;
    output::print_products(&items);
    Ok(())
}

pub async fn remove(ctx: &Context, product: String) -> Result<(), CliError> {
    let wishlist = ctx.storefront().wishlist();
    // Removal is applied to the local copy, so load it first
    wishlist.refresh().await?;
    wishlist.remove(&ProductId::new(product)).await?;
    output::print_products(&wishlist.items());
    Ok(())
}
