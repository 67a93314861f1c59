//! Catalog commands: list, one-shot search and interactive browse.

use tokio::io::{AsyncBufReadExt, BufReader};

use qkart_storefront::Storefront;
use qkart_storefront::services::Listing;

use super::{CliError, print_products};

/// `qkart products`
pub async fn products(storefront: &Storefront) -> Result<(), CliError> {
    let catalog = storefront.fetch_catalog().await?;
    print_products(&catalog);
    Ok(())
}

/// `qkart search <text>`
pub async fn search(storefront: &Storefront, text: &str) -> Result<(), CliError> {
    let products = storefront.search_catalog(text).await?;
    print_products(&products);
    Ok(())
}

/// `qkart browse`
///
/// Each line read from stdin replaces the search text. The listing is
/// printed whenever it changes; an empty line shows the whole catalog.
#[allow(clippy::print_stdout)]
pub async fn browse(storefront: &Storefront) -> Result<(), CliError> {
    let search = storefront.search_debouncer();
    let mut listing = search.subscribe();

    let page = storefront.enter_products(&search).await?;
    listing.mark_unchanged();
    print_products(&page.catalog);
    println!("Type to search, empty line for all products, Ctrl-D to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => search.on_query_change(line.trim()),
                    None => break,
                }
            }
            changed = listing.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = listing.borrow_and_update().clone();
                match &current {
                    Listing::Full(_) => println!("-- all products --"),
                    Listing::Filtered { query, .. } => println!("-- results for \"{query}\" --"),
                }
                print_products(current.products());
            }
        }
    }
    Ok(())
}
