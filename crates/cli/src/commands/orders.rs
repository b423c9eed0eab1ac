//! Order history and checkout commands.

use shopfront_client::models::Address;

use super::{CliError, Context};
use crate::output;

pub async fn list(ctx: &Context) -> Result<(), CliError> {
    let orders = ctx.storefront().checkout().orders().await?;
    output::print_orders(&orders);
    Ok(())
}

/// Place a cash-on-delivery order shipped to a saved address.
///
/// Without `address_id` the first saved address is used. With no saved
/// address at all the order is attempted with an empty address, which the
/// checkout rejects with its own message.
pub async fn checkout(ctx: &Context, address_id: Option<String>) -> Result<(), CliError> {
    let storefront = ctx.storefront();
    let addresses = storefront.addresses().list().await?;
    let shipping = select_address(&addresses, address_id.as_deref())?
        .map(Address::to_shipping)
        .unwrap_or_default();

    storefront.checkout().place_cash_order(&shipping).await?;
    output::print_cart(&storefront.cart().snapshot());
    Ok(())
}

fn select_address<'a>(
    addresses: &'a [Address],
    address_id: Option<&str>,
) -> Result<Option<&'a Address>, CliError> {
    match address_id {
        Some(id) => addresses
            .iter()
            .find(|address| address.id.as_str() == id)
            .map(Some)
            .ok_or_else(|| CliError::InvalidArgument(format!("No saved address with ID {id}"))),
        None => Ok(addresses.first()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::AddressId;

    fn address(id: &str) -> Address {
        Address {
            id: AddressId::new(id),
            name: "Home".to_string(),
            details: "12 Nile St".to_string(),
            phone: "01012345678".to_string(),
            city: "Cairo".to_string(),
        }
    }

    #[test]
    fn test_select_first_by_default() {
        let addresses = vec![address("a1"), address("a2")];
        let selected = select_address(&addresses, None).unwrap().unwrap();
        assert_eq!(selected.id.as_str(), "a1");
    }

    #[test]
    fn test_select_by_id() {
        let addresses = vec![address("a1"), address("a2")];
        let selected = select_address(&addresses, Some("a2")).unwrap().unwrap();
        assert_eq!(selected.id.as_str(), "a2");
    }

    #[test]
    fn test_select_unknown_id() {
        let addresses = vec![address("a1")];
        assert!(matches!(
            select_address(&addresses, Some("zz")),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_select_none_saved() {
        assert!(select_address(&[], None).unwrap().is_none());
    }
}
