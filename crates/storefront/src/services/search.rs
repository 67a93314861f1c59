//! Debounced catalog search.
//!
//! Every keystroke restarts a quiet-period timer; only when the timer runs
//! out is a search sent, for the text typed last. The listing to display is
//! published on a `watch` channel.
//!
//! Responses may arrive out of order. Each request is tagged with its query
//! text and its response is dropped unless that text is still current.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, instrument};

use qkart_core::Product;

use crate::api::CatalogApi;
use crate::error::{Action, StorefrontError};
use crate::notify::Notifier;

/// Products to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The whole catalog; the search box is empty.
    Full(Vec<Product>),
    /// Results for `query`. May be empty.
    Filtered { query: String, products: Vec<Product> },
}

impl Listing {
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Full(products) | Self::Filtered { products, .. } => products,
        }
    }

    /// The query these results are for, if filtered.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Full(_) => None,
            Self::Filtered { query, .. } => Some(query),
        }
    }
}

/// Current search text and the timer waiting to send it.
#[derive(Default)]
struct QueryState {
    text: String,
    timer: Option<AbortHandle>,
}

struct Shared {
    catalog: Mutex<Vec<Product>>,
    query: Mutex<QueryState>,
    listing: watch::Sender<Listing>,
}

impl Shared {
    fn query(&self) -> MutexGuard<'_, QueryState> {
        self.query.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn catalog(&self) -> MutexGuard<'_, Vec<Product>> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Turns search box input into at most one request per pause in typing.
///
/// Must be used from within a tokio runtime.
pub struct SearchDebouncer<S> {
    api: Arc<S>,
    notifier: Arc<dyn Notifier>,
    quiet_period: Duration,
    shared: Arc<Shared>,
}

impl<S: CatalogApi + 'static> SearchDebouncer<S> {
    #[must_use]
    pub fn new(api: Arc<S>, notifier: Arc<dyn Notifier>, quiet_period: Duration) -> Self {
        let (listing, _) = watch::channel(Listing::Full(Vec::new()));
        Self {
            api,
            notifier,
            quiet_period,
            shared: Arc::new(Shared {
                catalog: Mutex::new(Vec::new()),
                query: Mutex::new(QueryState::default()),
                listing,
            }),
        }
    }

    /// Replace the full catalog shown while the search box is empty.
    pub fn set_catalog(&self, products: Vec<Product>) {
        let query = self.shared.query();
        *self.shared.catalog() = products.clone();
        if query.text.is_empty() {
            self.shared.listing.send_replace(Listing::Full(products));
        }
    }

    /// Listen for listing changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Listing> {
        self.shared.listing.subscribe()
    }

    /// The listing currently displayed.
    #[must_use]
    pub fn listing(&self) -> Listing {
        self.shared.listing.borrow().clone()
    }

    /// React to the search box changing to `text`.
    ///
    /// Cancels any pending search. Empty text shows the full catalog at
    /// once; anything else is searched for after the quiet period unless
    /// another change arrives first.
    pub fn on_query_change(&self, text: &str) {
        let mut query = self.shared.query();
        if let Some(timer) = query.timer.take() {
            timer.abort();
        }
        text.clone_into(&mut query.text);

        if text.is_empty() {
            let catalog = self.shared.catalog().clone();
            self.shared.listing.send_replace(Listing::Full(catalog));
            return;
        }

        let api = Arc::clone(&self.api);
        let notifier = Arc::clone(&self.notifier);
        let shared = Arc::clone(&self.shared);
        let quiet_period = self.quiet_period;
        let text = text.to_string();

        // Aborting the timer must never cancel a request already sent, so
        // the request runs in its own task.
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            tokio::spawn(dispatch(api, notifier, shared, text));
        });
        query.timer = Some(timer.abort_handle());
    }
}

impl<S> Drop for SearchDebouncer<S> {
    fn drop(&mut self) {
        let mut query = self.shared.query();
        if let Some(timer) = query.timer.take() {
            timer.abort();
        }
    }
}

#[instrument(skip(api, notifier, shared))]
async fn dispatch<S: CatalogApi>(
    api: Arc<S>,
    notifier: Arc<dyn Notifier>,
    shared: Arc<Shared>,
    query: String,
) {
    let result = match api.search_products(&query).await {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    };

    let current = shared.query();
    if current.text != query {
        debug!(current = %current.text, "Discarding stale search response");
        return;
    }

    match result {
        Ok(products) => {
            debug!(results = products.len(), "Search complete");
            shared
                .listing
                .send_replace(Listing::Filtered { query, products });
        }
        Err(e) => {
            drop(current);
            let err = StorefrontError::from_api(Action::SearchProducts, e);
            notifier.notify(err.notice());
        }
    }
}
