//! Cart commands.

use shopfront_core::{ProductId, Quantity};

use super::{CliError, Context};
use crate::output;

/// Fetch and print the cart.
pub async fn show(ctx: &Context) -> Result<(), CliError> {
    let cart = ctx.storefront().cart().refresh().await?;
    output::print_cart(&cart);
    Ok(())
}

/// Add one unit of a product and print the updated cart.
pub async fn add(ctx: &Context, product: String) -> Result<(), CliError> {
    let cart = ctx
        .storefront()
        .cart()
        .add_item(&ProductId::new(product))
        .await?;
    output::print_cart(&cart);
    Ok(())
}

/// Set a line's quantity, clamped to the accepted range.
pub async fn set_quantity(ctx: &Context, product: String, quantity: i64) -> Result<(), CliError> {
    let requested = quantity;
    let quantity = Quantity::clamped(requested);
    if i64::from(quantity.get()) != requested {
        tracing::info!(requested, clamped = quantity.get(), "Quantity adjusted");
    }
    let cart = ctx
        .storefront()
        .cart()
        .update_quantity(&ProductId::new(product), quantity)
        .await?;
    output::print_cart(&cart);
    Ok(())
}

/// Remove a product and print the updated cart.
pub async fn remove(ctx: &Context, product: String) -> Result<(), CliError> {
    let cart = ctx
        .storefront()
        .cart()
        .remove_item(&ProductId::new(product))
        .await?;
    output::print_cart(&cart);
    Ok(())
}
