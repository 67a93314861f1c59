//! Integration tests for QKart.
//!
//! [`FakeBackend`] is an in-process axum server speaking the QKart backend
//! protocol on an ephemeral port. Tests point a real
//! [`Storefront`](qkart_storefront::Storefront) at it, so requests go
//! through `reqwest` and JSON exactly as in production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;

use qkart_core::{Address, AddressId, Price, Product, ProductId, Rating, ServerCartRecord};
use qkart_storefront::Storefront;
use qkart_storefront::config::{ApiConfig, ConfigError, StorefrontConfig};
use qkart_storefront::notify::RecordingNotifier;
use qkart_storefront::session::Session;

/// Password of every seeded user.
pub const PASSWORD: &str = "learnwithcrio";

// =============================================================================
// Backend data
// =============================================================================

struct User {
    password: String,
    token: Option<String>,
    balance: Price,
    cart: Vec<ServerCartRecord>,
    addresses: Vec<Address>,
}

#[derive(Default)]
struct BackendData {
    products: Vec<Product>,
    users: HashMap<String, User>,
    requests: Vec<String>,
}

/// Shared state of the fake backend.
#[derive(Clone, Default)]
pub struct FakeState {
    inner: Arc<Mutex<BackendData>>,
}

impl FakeState {
    fn data(&self) -> MutexGuard<'_, BackendData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error response in the backend's format.
#[derive(Debug)]
struct BackendError {
    status: StatusCode,
    message: &'static str,
}

impl BackendError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    const fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Protected route, Oauth2 Bearer token not found",
        )
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "message": self.message })),
        )
            .into_response()
    }
}

/// The seeded catalog.
#[must_use]
pub fn catalog() -> Vec<Product> {
    [
        ("BW0jAAeDJmlZCF8i", "Tan Leatherette Weekender Duffle", "Fashion", 100, 4),
        ("KCRwjF7lN97HnEaY", "The Minimalist Slim Leather Watch", "Fashion", 10, 5),
        ("a4sLtEcMpzabRyfx", "Running Shoes", "Sports", 250, 3),
        ("upLK9JbQ4rMhTwt4", "Shoulder Bag", "Fashion", 90, 4),
    ]
    .into_iter()
    .map(|(id, name, category, cost, stars)| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        cost: Price::from_units(cost),
        rating: Rating::new(stars).unwrap_or_default(),
        image_url: format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{id}.png"),
    })
    .collect()
}

// =============================================================================
// FakeBackend
// =============================================================================

/// A running fake backend. Stops when dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    state: FakeState,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend serving [`catalog`] with no users.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = FakeState::default();
        state.data().products = catalog();

        let app = Router::new()
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/search", get(search_products))
            .route("/api/v1/cart", get(get_cart).post(upsert_cart))
            .route("/api/v1/cart/checkout", post(checkout))
            .route("/api/v1/user/addresses", get(list_addresses).post(add_address))
            .route("/api/v1/user/addresses/{id}", delete(delete_address))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:41234/api/v1`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Add a user with [`PASSWORD`] and the given wallet balance.
    pub fn add_user(&self, username: &str, balance: u32) {
        self.state.data().users.insert(
            username.to_string(),
            User {
                password: PASSWORD.to_string(),
                token: None,
                balance: Price::from_units(balance),
                cart: Vec::new(),
                addresses: Vec::new(),
            },
        );
    }

    /// Server-side cart of `username`.
    #[must_use]
    pub fn cart_of(&self, username: &str) -> Vec<ServerCartRecord> {
        self.state
            .data()
            .users
            .get(username)
            .map(|u| u.cart.clone())
            .unwrap_or_default()
    }

    /// Server-side wallet balance of `username`.
    #[must_use]
    pub fn balance_of(&self, username: &str) -> Option<Price> {
        self.state.data().users.get(username).map(|u| u.balance)
    }

    /// Requests received so far, as `"METHOD /path"`, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state.data().requests.clone()
    }

    /// Number of requests received for `"METHOD /path"`.
    #[must_use]
    pub fn count(&self, request: &str) -> usize {
        self.state
            .data()
            .requests
            .iter()
            .filter(|r| r.as_str() == request)
            .count()
    }

    /// A storefront pointed at this backend with an in-memory session and
    /// no response caching.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the endpoint is rejected.
    pub fn storefront(&self) -> Result<(Storefront, RecordingNotifier), ConfigError> {
        self.storefront_with(Session::in_memory(), Duration::ZERO, Duration::from_millis(50))
    }

    /// A storefront with an explicit session, cache TTL and search quiet period.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the endpoint is rejected.
    pub fn storefront_with(
        &self,
        session: Session,
        cache_ttl: Duration,
        search_debounce: Duration,
    ) -> Result<(Storefront, RecordingNotifier), ConfigError> {
        let notifier = RecordingNotifier::new();
        let config = StorefrontConfig {
            api: ApiConfig::new(&self.endpoint(), cache_ttl)?,
            search_debounce,
            session_file: PathBuf::from(".qkart-session.json"),
            sentry_dsn: None,
        };
        let storefront = Storefront::new(config, session, Arc::new(notifier.clone()));
        Ok((storefront, notifier))
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn record_request(State(state): State<FakeState>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    state.data().requests.push(line);
    next.run(request).await
}

/// Find the user owning the bearer token and run `f` on them.
fn with_user<T>(
    state: &FakeState,
    headers: &HeaderMap,
    f: impl FnOnce(&mut User, &[Product]) -> Result<T, BackendError>,
) -> Result<T, BackendError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(BackendError::unauthorized)?;

    let mut data = state.data();
    let BackendData {
        products, users, ..
    } = &mut *data;
    let user = users
        .values_mut()
        .find(|u| u.token.as_deref() == Some(token))
        .ok_or_else(BackendError::unauthorized)?;
    f(user, products)
}

async fn list_products(State(state): State<FakeState>) -> Json<Vec<Product>> {
    Json(state.data().products.clone())
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    value: String,
}

async fn search_products(
    State(state): State<FakeState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>, BackendError> {
    let needle = params.value.to_lowercase();
    let found: Vec<Product> = state
        .data()
        .products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if found.is_empty() {
        return Err(BackendError::new(StatusCode::NOT_FOUND, "No products found"));
    }
    Ok(Json(found))
}

async fn get_cart(
    State(state): State<FakeState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ServerCartRecord>>, BackendError> {
    with_user(&state, &headers, |user, _| Ok(Json(user.cart.clone())))
}

#[derive(Deserialize)]
struct UpsertBody {
    #[serde(rename = "productId")]
    product_id: ProductId,
    qty: u32,
}

async fn upsert_cart(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<UpsertBody>,
) -> Result<Json<Vec<ServerCartRecord>>, BackendError> {
    with_user(&state, &headers, |user, products| {
        if !products.iter().any(|p| p.id == body.product_id) {
            return Err(BackendError::new(
                StatusCode::NOT_FOUND,
                "Product doesn't exist",
            ));
        }
        let position = user.cart.iter().position(|r| r.product_id == body.product_id);
        match (position, body.qty) {
            (Some(i), 0) => {
                user.cart.remove(i);
            }
            (Some(i), qty) => {
                if let Some(record) = user.cart.get_mut(i) {
                    record.quantity = qty;
                }
            }
            (None, 0) => {}
            (None, qty) => user.cart.push(ServerCartRecord::new(body.product_id, qty)),
        }
        Ok(Json(user.cart.clone()))
    })
}

#[derive(Deserialize)]
struct CheckoutBody {
    #[serde(rename = "addressId")]
    address_id: AddressId,
}

async fn checkout(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<serde_json::Value>, BackendError> {
    with_user(&state, &headers, |user, products| {
        if user.cart.is_empty() {
            return Err(BackendError::new(StatusCode::BAD_REQUEST, "Cart is empty"));
        }
        if !user.addresses.iter().any(|a| a.id == body.address_id) {
            return Err(BackendError::new(StatusCode::BAD_REQUEST, "Bad address"));
        }
        let total: Price = user
            .cart
            .iter()
            .filter_map(|r| {
                products
                    .iter()
                    .find(|p| p.id == r.product_id)
                    .map(|p| p.cost.times(r.quantity))
            })
            .sum();
        if user.balance < total {
            return Err(BackendError::new(
                StatusCode::BAD_REQUEST,
                "Wallet balance not sufficient to place order",
            ));
        }
        user.balance = user.balance.saturating_sub(total);
        user.cart.clear();
        Ok(Json(json!({ "success": true })))
    })
}

async fn list_addresses(
    State(state): State<FakeState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Address>>, BackendError> {
    with_user(&state, &headers, |user, _| Ok(Json(user.addresses.clone())))
}

#[derive(Deserialize)]
struct AddressBody {
    address: String,
}

async fn add_address(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Result<Json<Vec<Address>>, BackendError> {
    with_user(&state, &headers, |user, _| {
        if body.address.chars().count() < 20 {
            return Err(BackendError::new(
                StatusCode::BAD_REQUEST,
                "\"address\" length must be at least 20 characters long",
            ));
        }
        user.addresses.push(Address {
            id: AddressId::new(uuid::Uuid::new_v4().to_string()),
            text: body.address,
        });
        Ok(Json(user.addresses.clone()))
    })
}

async fn delete_address(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<Address>>, BackendError> {
    with_user(&state, &headers, |user, _| {
        let before = user.addresses.len();
        user.addresses.retain(|a| a.id.as_str() != id);
        if user.addresses.len() == before {
            return Err(BackendError::new(StatusCode::NOT_FOUND, "Address not found"));
        }
        Ok(Json(user.addresses.clone()))
    })
}

#[derive(Deserialize)]
struct CredentialsBody {
    username: String,
    password: String,
}

async fn login(
    State(state): State<FakeState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), BackendError> {
    let mut data = state.data();
    let user = data
        .users
        .get_mut(&body.username)
        .ok_or(BackendError::new(
            StatusCode::BAD_REQUEST,
            "Username does not exist",
        ))?;
    if user.password != body.password {
        return Err(BackendError::new(
            StatusCode::BAD_REQUEST,
            "Password is incorrect",
        ));
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    user.token = Some(token.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "token": token,
            "username": body.username,
            "balance": user.balance,
        })),
    ))
}

async fn register(
    State(state): State<FakeState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), BackendError> {
    let mut data = state.data();
    if data.users.contains_key(&body.username) {
        return Err(BackendError::new(
            StatusCode::BAD_REQUEST,
            "Username is already taken",
        ));
    }
    data.users.insert(
        body.username,
        User {
            password: body.password,
            token: None,
            balance: Price::from_units(5000),
            cart: Vec::new(),
            addresses: Vec::new(),
        },
    );
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}
