//! Saved address commands.

use shopfront_client::models::NewAddress;
use shopfront_core::AddressId;

use super::{CliError, Context};
use crate::output;

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let addresses = ctx.storefront().addresses().list().await?;
    output::print_addresses(&addresses);
    Ok(())
}

pub async fn add(
    ctx: &Context,
    name: String,
    details: String,
    phone: String,
    city: String,
) -> Result<(), CliError> {
    let address = NewAddress {
        name,
        details,
        phone,
        city,
    };
    let addresses = ctx.storefront().addresses().add(&address).await?;
    output::print_addresses(&addresses);
    Ok(())
}

pub async fn remove(ctx: &Context, id: String) -> Result<(), CliError> {
    let addresses = ctx
        .storefront()
        .addresses()
        .remove(&AddressId::new(id))
        .await?;
    output::print_addresses(&addresses);
    Ok(())
}
