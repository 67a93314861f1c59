//! Shipping address commands.

use qkart_core::{AddressCollection, AddressId};
use qkart_storefront::Storefront;

use super::CliError;

/// `qkart address list`
pub async fn list(storefront: &Storefront) -> Result<(), CliError> {
    let mut addresses = AddressCollection::default();
    storefront.addresses().refresh(&mut addresses).await?;
    print_addresses(&addresses);
    Ok(())
}

/// `qkart address add <text>`
pub async fn add(storefront: &Storefront, text: &str) -> Result<(), CliError> {
    let mut addresses = AddressCollection::default();
    storefront.addresses().add(&mut addresses, text).await?;
    print_addresses(&addresses);
    Ok(())
}

/// `qkart address delete <id>`
pub async fn delete(storefront: &Storefront, id: &str) -> Result<(), CliError> {
    let mut addresses = AddressCollection::default();
    storefront
        .addresses()
        .delete(&mut addresses, &AddressId::new(id))
        .await?;
    print_addresses(&addresses);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_addresses(addresses: &AddressCollection) {
    if addresses.is_empty() {
        println!("No addresses found for this account. Please add one to proceed");
        return;
    }
    for address in addresses.entries() {
        println!("{:<38} {}", address.id, address.text);
    }
}
