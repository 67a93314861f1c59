//! Storefront state shared across screens.

use std::sync::Arc;

use tracing::{instrument, warn};

use qkart_core::{AddressCollection, CartItem, Product};

use crate::api::{AddressApi, ApiClient, AuthApi, CartApi, CatalogApi};
use crate::config::StorefrontConfig;
use crate::error::{Action, StorefrontError};
use crate::notify::Notifier;
use crate::services::{AddressBook, AuthService, CartMutator, CheckoutExecutor, SearchDebouncer};
use crate::session::Session;

/// Everything the storefront needs from the backend.
pub trait Backend: CatalogApi + CartApi + AddressApi + AuthApi + 'static {}

impl<T> Backend for T where T: CatalogApi + CartApi + AddressApi + AuthApi + 'static {}

/// Data for the products screen.
#[derive(Debug, Clone, Default)]
pub struct ProductsPage {
    pub catalog: Vec<Product>,
    /// Empty when logged out.
    pub cart: Vec<CartItem>,
}

/// Data for the checkout screen.
#[derive(Debug, Clone, Default)]
pub struct CheckoutPage {
    pub catalog: Vec<Product>,
    pub items: Vec<CartItem>,
    pub addresses: AddressCollection,
}

/// Storefront state shared across screens.
///
/// This struct is cheaply cloneable via `Arc`. All services share one
/// [`Session`] and one backend client.
pub struct Storefront<A = ApiClient> {
    inner: Arc<StorefrontInner<A>>,
}

struct StorefrontInner<A> {
    config: StorefrontConfig,
    api: Arc<A>,
    session: Session,
    notifier: Arc<dyn Notifier>,
    cart: CartMutator<A>,
    checkout: CheckoutExecutor<A>,
    addresses: AddressBook<A>,
    auth: AuthService<A>,
}

impl<A> Clone for Storefront<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Storefront {
    /// Create a storefront talking to the configured backend.
    #[must_use]
    pub fn new(config: StorefrontConfig, session: Session, notifier: Arc<dyn Notifier>) -> Self {
        let api = Arc::new(ApiClient::new(&config.api));
        Self::with_api(config, api, session, notifier)
    }
}

impl<A: Backend> Storefront<A> {
    /// Create a storefront over any backend implementation.
    #[must_use]
    pub fn with_api(
        config: StorefrontConfig,
        api: Arc<A>,
        session: Session,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                cart: CartMutator::new(Arc::clone(&api), session.clone()),
                checkout: CheckoutExecutor::new(Arc::clone(&api), session.clone()),
                addresses: AddressBook::new(Arc::clone(&api), session.clone()),
                auth: AuthService::new(Arc::clone(&api), session.clone()),
                config,
                api,
                session,
                notifier,
            }),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    #[must_use]
    pub fn cart(&self) -> &CartMutator<A> {
        &self.inner.cart
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutExecutor<A> {
        &self.inner.checkout
    }

    #[must_use]
    pub fn addresses(&self) -> &AddressBook<A> {
        &self.inner.addresses
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService<A> {
        &self.inner.auth
    }

    /// A new search debouncer using the configured quiet period.
    #[must_use]
    pub fn search_debouncer(&self) -> SearchDebouncer<A> {
        SearchDebouncer::new(
            Arc::clone(&self.inner.api),
            Arc::clone(&self.inner.notifier),
            self.inner.config.search_debounce,
        )
    }

    /// Fetch the full catalog.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn fetch_catalog(&self) -> Result<Vec<Product>, StorefrontError> {
        self.inner
            .api
            .list_products()
            .await
            .map_err(|e| StorefrontError::from_api(Action::FetchProducts, e))
    }

    /// Search the catalog once, without debouncing.
    ///
    /// # Errors
    ///
    /// Returns the backend failure. No match is an empty list, not an error.
    pub async fn search_catalog(&self, text: &str) -> Result<Vec<Product>, StorefrontError> {
        match self.inner.api.search_products(text).await {
            Ok(products) => Ok(products),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(StorefrontError::from_api(Action::SearchProducts, e)),
        }
    }

    // =========================================================================
    // Screens
    // =========================================================================

    /// Load the products screen.
    ///
    /// Seeds `search` with the catalog. A cart that fails to load is
    /// reported through the notifier and shown as empty.
    ///
    /// # Errors
    ///
    /// Returns the backend failure if the catalog cannot be fetched.
    #[instrument(skip_all)]
    pub async fn enter_products(
        &self,
        search: &SearchDebouncer<A>,
    ) -> Result<ProductsPage, StorefrontError> {
        let catalog = self.fetch_catalog().await?;
        search.set_catalog(catalog.clone());

        let cart = match self.inner.cart.load(&catalog).await {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, "Cart unavailable");
                self.inner.notifier.notify(e.notice());
                Vec::new()
            }
        };

        Ok(ProductsPage { catalog, cart })
    }

    /// Load the checkout screen.
    ///
    /// # Errors
    ///
    /// - `StorefrontError::Unauthenticated` if there is no session
    /// - the backend failure if the catalog, cart or addresses cannot be
    ///   fetched
    #[instrument(skip_all)]
    pub async fn enter_checkout(&self) -> Result<CheckoutPage, StorefrontError> {
        if !self.inner.session.is_logged_in() {
            return Err(StorefrontError::Unauthenticated(Action::PlaceOrder));
        }

        let catalog = self.fetch_catalog().await?;
        let items = self.inner.cart.load(&catalog).await?;
        let mut addresses = AddressCollection::default();
        self.inner.addresses.refresh(&mut addresses).await?;

        Ok(CheckoutPage {
            catalog,
            items,
            addresses,
        })
    }
}
