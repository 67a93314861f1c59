//! QKart CLI - Command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! qkart products
//! qkart search shoes
//! qkart browse            # type queries, results follow as you pause
//!
//! # Account
//! qkart register crio.do --password learnwithcrio --confirm learnwithcrio
//! qkart login crio.do --password learnwithcrio
//! qkart logout
//!
//! # Cart and checkout
//! qkart cart add <PRODUCT_ID>
//! qkart cart set <PRODUCT_ID> 3
//! qkart address add "Crio.Do, Bengaluru"
//! qkart checkout --address <ADDRESS_ID>
//! ```
//!
//! # Environment Variables
//!
//! See `qkart_storefront::config` for the full list. `QKART_API_ENDPOINT`
//! is required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qkart_storefront::Storefront;
use qkart_storefront::config::StorefrontConfig;
use qkart_storefront::session::{FileSessionStore, Session};

mod commands;

use commands::{CliError, ConsoleNotifier};

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the whole catalog
    Products,
    /// Search the catalog once
    Search {
        /// Text to search for in product names and categories
        text: String,
    },
    /// Search interactively, one query per line
    Browse,
    /// Log in and save the session
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        username: String,
        #[arg(short, long)]
        password: String,
        /// Password again
        #[arg(short, long)]
        confirm: String,
    },
    /// Forget the saved session
    Logout,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage shipping addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// ID of the shipping address
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with its total
    Show,
    /// Add a product (once)
    Add { product_id: String },
    /// Set a product's quantity; 0 removes it
    Set { product_id: String, quantity: u32 },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add { text: String },
    /// Delete a saved address
    Delete { id: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => ConsoleNotifier::fail(&CliError::from(e)),
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for the storefront if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(config.sentry_dsn.as_ref().map(|_| {
            sentry_tracing::layer().event_filter(sentry_event_filter)
        }))
        .init();

    if let Err(e) = run(cli, config).await {
        tracing::debug!(error = ?e, "Command failed");
        ConsoleNotifier::fail(&e);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let session = Session::new(FileSessionStore::open(&config.session_file)?);
    let storefront = Storefront::new(config, session, Arc::new(ConsoleNotifier));

    match cli.command {
        Commands::Products => commands::catalog::products(&storefront).await?,
        Commands::Search { text } => commands::catalog::search(&storefront, &text).await?,
        Commands::Browse => commands::catalog::browse(&storefront).await?,
        Commands::Login { username, password } => {
            commands::account::login(&storefront, &username, &password).await?;
        }
        Commands::Register {
            username,
            password,
            confirm,
        } => commands::account::register(&storefront, &username, &password, &confirm).await?,
        Commands::Logout => commands::account::logout(&storefront)?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add { product_id } => commands::cart::add(&storefront, &product_id).await?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&storefront, &product_id, quantity).await?,
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list(&storefront).await?,
            AddressAction::Add { text } => commands::address::add(&storefront, &text).await?,
            AddressAction::Delete { id } => commands::address::delete(&storefront, &id).await?,
        },
        Commands::Checkout { address } => commands::checkout::place(&storefront, &address).await?,
    }
    Ok(())
}
