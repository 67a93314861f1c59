//! CLI command implementations.
//!
//! Commands print results to stdout and notices to stderr.

pub mod account;
pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;

use thiserror::Error;

use qkart_core::{CartItem, Notice, NoticeLevel, Product, item_count, total_cart_value};
use qkart_storefront::StorefrontError;
use qkart_storefront::config::ConfigError;
use qkart_storefront::notify::Notifier;
use qkart_storefront::session::SessionError;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error("Could not read input: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    fn notice(&self) -> Notice {
        match self {
            Self::Storefront(e) => e.notice(),
            Self::Config(_) | Self::Session(_) | Self::Io(_) => Notice::error(self.to_string()),
        }
    }
}

/// Prints notices to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Print the error's notice and exit with status 1.
    pub fn fail(err: &CliError) -> ! {
        Self.notify(err.notice());
        std::process::exit(1);
    }
}

impl Notifier for ConsoleNotifier {
    #[allow(clippy::print_stderr)]
    fn notify(&self, notice: Notice) {
        let label = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("{label}: {}", notice.message);
    }
}

// =============================================================================
// Output
// =============================================================================

#[allow(clippy::print_stdout)]
fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for product in products {
        println!(
            "{:<26} {:<40} {:<12} {:>8}  {}/5",
            product.id,
            product.name,
            product.category,
            product.cost,
            product.rating.stars()
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        println!("Cart is empty. Add more items to the cart to checkout");
        return;
    }
    for item in items {
        println!(
            "{:<26} {:<40} {:>3} x {:>8} = {:>8}",
            item.product_id,
            item.name,
            item.quantity,
            item.cost,
            item.line_total()
        );
    }
    println!(
        "Order total: {} ({} items)",
        total_cart_value(items),
        item_count(items)
    );
}
