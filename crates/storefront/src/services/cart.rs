//! Cart operations.
//!
//! The backend owns the cart. Every mutation sends one upsert and replaces
//! the local list with the server's answer, enriched against the catalog.

use std::sync::Arc;

use tracing::{debug, instrument};

use qkart_core::{CartItem, Product, ProductId, cart::contains_product, reconcile};

use super::ActionGuard;
use crate::api::CartApi;
use crate::error::{Action, StorefrontError, ValidationFailure};
use crate::session::Session;

/// How an upsert treats a product that is already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpsertOptions {
    /// Reject the change if the product already has a cart line.
    pub prevent_duplicate: bool,
}

impl UpsertOptions {
    /// "Add to cart" from the catalog: a product may only be added once.
    #[must_use]
    pub const fn add_to_cart() -> Self {
        Self {
            prevent_duplicate: true,
        }
    }

    /// Quantity buttons on an existing cart line.
    #[must_use]
    pub const fn quantity_change() -> Self {
        Self {
            prevent_duplicate: false,
        }
    }
}

/// Loads and mutates the logged-in user's cart.
pub struct CartMutator<A> {
    api: Arc<A>,
    session: Session,
    guard: Arc<ActionGuard>,
}

impl<A> Clone for CartMutator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<A: CartApi> CartMutator<A> {
    #[must_use]
    pub fn new(api: Arc<A>, session: Session) -> Self {
        Self {
            api,
            session,
            guard: Arc::new(ActionGuard::new(Action::UpdateCart)),
        }
    }

    /// Fetch the cart and enrich it against `catalog`.
    ///
    /// Without a session the cart is empty and no request is made.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Server` or `StorefrontError::Transport` if
    /// the cart cannot be fetched.
    #[instrument(skip_all)]
    pub async fn load(&self, catalog: &[Product]) -> Result<Vec<CartItem>, StorefrontError> {
        let Some(token) = self.session.token() else {
            debug!("No session, cart is empty");
            return Ok(Vec::new());
        };

        let records = self
            .api
            .get_cart(&token)
            .await
            .map_err(|e| StorefrontError::from_api(Action::FetchCart, e))?;

        Ok(reconcile(&records, catalog))
    }

    /// Set the quantity of `product_id` in the cart.
    ///
    /// A quantity of 0 removes the line. On success the returned list is the
    /// server's cart, not `current` with a local edit applied.
    ///
    /// # Errors
    ///
    /// - `StorefrontError::Unauthenticated` if there is no session
    /// - `ValidationFailure::DuplicateItem` if `options.prevent_duplicate`
    ///   is set and the product is already in `current`
    /// - `StorefrontError::InFlight` if another cart change is pending
    /// - `StorefrontError::Server` / `StorefrontError::Transport` if the
    ///   backend rejects or cannot be reached
    #[instrument(skip(self, current, catalog), fields(product_id = %product_id))]
    pub async fn add_or_update(
        &self,
        current: &[CartItem],
        catalog: &[Product],
        product_id: &ProductId,
        quantity: u32,
        options: UpsertOptions,
    ) -> Result<Vec<CartItem>, StorefrontError> {
        let token = self
            .session
            .token()
            .ok_or(StorefrontError::Unauthenticated(Action::UpdateCart))?;

        if options.prevent_duplicate && contains_product(current, product_id) {
            return Err(ValidationFailure::DuplicateItem(product_id.clone()).into());
        }

        let _pending = self.guard.try_acquire()?;

        let records = self
            .api
            .upsert_cart_item(&token, product_id, quantity)
            .await
            .map_err(|e| StorefrontError::from_api(Action::UpdateCart, e))?;

        debug!(lines = records.len(), "Cart updated");
        Ok(reconcile(&records, catalog))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use qkart_core::{Price, ServerCartRecord};

    use super::*;
    use crate::api::mock::{Call, Endpoint, Failure, MockApi, TEST_TOKEN, product};
    use crate::session::{AuthToken, SessionStart, SessionUpdate};

    fn catalog() -> Vec<Product> {
        vec![
            product("p1", "Tan Leatherette Weekender Duffle", 150),
            product("p2", "The Minimalist Slim Leather Watch", 60),
        ]
    }

    fn logged_in() -> Session {
        let session = Session::in_memory();
        session
            .apply(SessionUpdate::Start(SessionStart {
                token: AuthToken::new(TEST_TOKEN),
                username: "crio.do".to_string(),
                balance: Price::from_units(5000),
            }))
            .unwrap();
        session
    }

    fn mutator(api: &Arc<MockApi>, session: Session) -> CartMutator<MockApi> {
        CartMutator::new(Arc::clone(api), session)
    }

    #[tokio::test]
    async fn test_load_without_session_is_empty() {
        let api = Arc::new(MockApi::with_products(catalog()));
        api.set_cart(vec![ServerCartRecord::new("p1", 1)]);

        let items = mutator(&api, Session::in_memory())
            .load(&catalog())
            .await
            .unwrap();

        assert!(items.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_enriches_server_cart() {
        let api = Arc::new(MockApi::with_products(catalog()));
        api.set_cart(vec![
            ServerCartRecord::new("p2", 3),
            ServerCartRecord::new("gone", 1),
        ]);

        let items = mutator(&api, logged_in()).load(&catalog()).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id.as_str(), "p2");
        assert_eq!(items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_requires_session() {
        let api = Arc::new(MockApi::with_products(catalog()));
        let result = mutator(&api, Session::in_memory())
            .add_or_update(&[], &catalog(), &ProductId::new("p1"), 1, UpsertOptions::add_to_cart())
            .await;

        assert!(matches!(
            result,
            Err(StorefrontError::Unauthenticated(Action::UpdateCart))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_add_makes_no_request() {
        let api = Arc::new(MockApi::with_products(catalog()));
        let current = vec![CartItem::from_product(&catalog()[0], 1)];

        let result = mutator(&api, logged_in())
            .add_or_update(
                &current,
                &catalog(),
                &ProductId::new("p1"),
                1,
                UpsertOptions::add_to_cart(),
            )
            .await;

        assert!(matches!(
            result,
            Err(StorefrontError::Validation(ValidationFailure::DuplicateItem(_)))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_quantity_change_replaces_with_server_cart() {
        let api = Arc::new(MockApi::with_products(catalog()));
        // Server already has a line the client has not seen yet.
        api.set_cart(vec![
            ServerCartRecord::new("p1", 1),
            ServerCartRecord::new("p2", 1),
        ]);
        let current = vec![CartItem::from_product(&catalog()[0], 1)];

        let items = mutator(&api, logged_in())
            .add_or_update(
                &current,
                &catalog(),
                &ProductId::new("p1"),
                2,
                UpsertOptions::quantity_change(),
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].product_id.as_str(), "p2");
        assert_eq!(api.calls(), vec![Call::Upsert(ProductId::new("p1"), 2)]);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_sent_and_removes_line() {
        let api = Arc::new(MockApi::with_products(catalog()));
        api.set_cart(vec![ServerCartRecord::new("p1", 4)]);
        let current = vec![CartItem::from_product(&catalog()[0], 4)];

        let items = mutator(&api, logged_in())
            .add_or_update(
                &current,
                &catalog(),
                &ProductId::new("p1"),
                0,
                UpsertOptions::quantity_change(),
            )
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(api.calls(), vec![Call::Upsert(ProductId::new("p1"), 0)]);
    }

    #[tokio::test]
    async fn test_server_message_passes_through() {
        let api = Arc::new(MockApi::with_products(catalog()));
        let result = mutator(&api, logged_in())
            .add_or_update(&[], &catalog(), &ProductId::new("nope"), 1, UpsertOptions::add_to_cart())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, StorefrontError::Server { status: 404, .. }));
        assert_eq!(err.notice().message, "Product doesn't exist");
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic() {
        let api = Arc::new(MockApi::with_products(catalog()));
        api.fail(Endpoint::Upsert, Failure::Status(502));

        let err = mutator(&api, logged_in())
            .add_or_update(&[], &catalog(), &ProductId::new("p1"), 1, UpsertOptions::add_to_cart())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Could not update cart. Check that the backend is running, reachable and returns valid JSON."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_change_is_rejected() {
        let api = Arc::new(MockApi::with_products(catalog()));
        api.delay_upsert(Duration::from_millis(300));
        let mutator = mutator(&api, logged_in());
        let catalog = catalog();
        let p1 = ProductId::new("p1");
        let p2 = ProductId::new("p2");

        let (first, second) = tokio::join!(
            mutator.add_or_update(&[], &catalog, &p1, 1, UpsertOptions::add_to_cart()),
            mutator.add_or_update(&[], &catalog, &p2, 1, UpsertOptions::add_to_cart()),
        );

        assert_eq!(first.unwrap().len(), 1);
        assert!(matches!(
            second,
            Err(StorefrontError::InFlight(Action::UpdateCart))
        ));
        assert_eq!(api.calls(), vec![Call::Upsert(p1, 1)]);

        // Guard is released once the first change completes.
        assert!(!mutator.guard.is_busy());
    }
}
