//! Cart commands.

use qkart_core::ProductId;
use qkart_storefront::Storefront;
use qkart_storefront::services::UpsertOptions;

use super::{CliError, print_cart};

/// `qkart cart show`
pub async fn show(storefront: &Storefront) -> Result<(), CliError> {
    let catalog = storefront.fetch_catalog().await?;
    let items = storefront.cart().load(&catalog).await?;
    print_cart(&items);
    Ok(())
}

/// `qkart cart add <product_id>`
pub async fn add(storefront: &Storefront, product_id: &str) -> Result<(), CliError> {
    upsert(storefront, product_id, 1, UpsertOptions::add_to_cart()).await
}

/// `qkart cart set <product_id> <quantity>`
pub async fn set(storefront: &Storefront, product_id: &str, quantity: u32) -> Result<(), CliError> {
    upsert(
        storefront,
        product_id,
        quantity,
        UpsertOptions::quantity_change(),
    )
    .await
}

async fn upsert(
    storefront: &Storefront,
    product_id: &str,
    quantity: u32,
    options: UpsertOptions,
) -> Result<(), CliError> {
    let catalog = storefront.fetch_catalog().await?;
    let current = storefront.cart().load(&catalog).await?;

    let items = storefront
        .cart()
        .add_or_update(
            &current,
            &catalog,
            &ProductId::new(product_id),
            quantity,
            options,
        )
        .await?;

    print_cart(&items);
    Ok(())
}
