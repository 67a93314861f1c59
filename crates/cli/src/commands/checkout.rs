//! Checkout command.

use qkart_core::{AddressCollection, AddressId, Notice};
use qkart_storefront::Storefront;
use qkart_storefront::notify::Notifier;

use super::{CliError, print_cart};

/// `qkart checkout --address <id>`
///
/// Loads the checkout screen, selects the address and places the order.
pub async fn place(storefront: &Storefront, address: &str) -> Result<(), CliError> {
    let mut page = storefront.enter_checkout().await?;
    print_cart(&page.items);

    choose_address(&mut page.addresses, address);

    let receipt = storefront
        .checkout()
        .place_order(&page.items, &page.addresses)
        .await?;

    let notifier = storefront.notifier();
    notifier.notify(Notice::success("Order placed successfully!"));
    notifier.notify(Notice::info(format!(
        "Paid {}, wallet balance is now {}",
        receipt.total, receipt.remaining_balance
    )));
    Ok(())
}

/// Select `id` as the shipping address. An unknown id leaves nothing
/// selected so the usual checkout checks decide which warning is shown.
fn choose_address(addresses: &mut AddressCollection, id: &str) {
    if let Err(e) = addresses.select(&AddressId::new(id)) {
        tracing::warn!(error = %e, "Ignoring unknown shipping address");
        addresses.deselect();
    }
}
