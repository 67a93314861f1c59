//! In-memory backend double for service tests.
//!
//! Behaves like the real backend for the happy paths (cart upserts replace
//! lines, quantity 0 removes, checkout empties the cart) and records every
//! call so tests can assert that a guard made no network request.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use qkart_core::{Address, AddressId, Price, Product, ProductId, Rating, ServerCartRecord};

use super::{AddressApi, ApiError, AuthApi, CartApi, CatalogApi, LoginResponse};
use crate::session::AuthToken;

pub const TEST_TOKEN: &str = "testtoken";
pub const TEST_PASSWORD: &str = "learnwithcrio";

/// A call made against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    Search(String),
    GetCart,
    Upsert(ProductId, u32),
    Checkout(AddressId),
    ListAddresses,
    AddAddress(String),
    DeleteAddress(AddressId),
    Login(String),
    Register(String),
}

/// Endpoint selector for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListProducts,
    Search,
    GetCart,
    Upsert,
    Checkout,
    Addresses,
}

/// Failure to return from an endpoint.
#[derive(Debug, Clone)]
pub enum Failure {
    Server(u16, &'static str),
    Status(u16),
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Self::Server(status, message) => ApiError::Server {
                status: *status,
                message: (*message).to_string(),
            },
            Self::Status(status) => ApiError::UnexpectedStatus(*status),
        }
    }
}

#[derive(Default)]
struct MockState {
    products: Vec<Product>,
    cart: Vec<ServerCartRecord>,
    addresses: Vec<Address>,
    next_address: u32,
    search_delays: HashMap<String, Duration>,
    upsert_delay: Duration,
    checkout_delay: Duration,
    failures: HashMap<Endpoint, Failure>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

pub fn product(id: &str, name: &str, cost: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: "Fashion".to_string(),
        cost: Price::from_units(cost),
        rating: Rating::new(4).unwrap_or_default(),
        image_url: format!("https://img.example/{id}.png"),
    }
}

impl MockApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        api.state().products = products;
        api
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_cart(&self, cart: Vec<ServerCartRecord>) {
        self.state().cart = cart;
    }

    pub fn cart(&self) -> Vec<ServerCartRecord> {
        self.state().cart.clone()
    }

    pub fn set_addresses(&self, addresses: Vec<Address>) {
        self.state().addresses = addresses;
    }

    pub fn delay_search(&self, text: &str, delay: Duration) {
        self.state().search_delays.insert(text.to_string(), delay);
    }

    pub fn delay_upsert(&self, delay: Duration) {
        self.state().upsert_delay = delay;
    }

    pub fn delay_checkout(&self, delay: Duration) {
        self.state().checkout_delay = delay;
    }

    pub fn fail(&self, endpoint: Endpoint, failure: Failure) {
        self.state().failures.insert(endpoint, failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    fn record(&self, call: Call, endpoint: Endpoint) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(call);
        state.failures.get(&endpoint).map_or(Ok(()), |f| Err(f.to_error()))
    }

    fn authorize(token: &AuthToken) -> Result<(), ApiError> {
        if token.expose() == TEST_TOKEN {
            Ok(())
        } else {
            Err(ApiError::Server {
                status: 401,
                message: "Protected route, Oauth2 Bearer token not found".to_string(),
            })
        }
    }
}

impl CatalogApi for MockApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record(Call::ListProducts, Endpoint::ListProducts)?;
        Ok(self.state().products.clone())
    }

    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let delay = self.state().search_delays.get(text).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::Search(text.to_string()), Endpoint::Search)?;

        let needle = text.to_lowercase();
        Ok(self
            .state()
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

impl CartApi for MockApi {
    async fn get_cart(&self, token: &AuthToken) -> Result<Vec<ServerCartRecord>, ApiError> {
        self.record(Call::GetCart, Endpoint::GetCart)?;
        Self::authorize(token)?;
        Ok(self.cart())
    }

    async fn upsert_cart_item(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<ServerCartRecord>, ApiError> {
        let delay = self.state().upsert_delay;
        tokio::time::sleep(delay).await;
        self.record(Call::Upsert(product_id.clone(), quantity), Endpoint::Upsert)?;
        Self::authorize(token)?;

        let mut state = self.state();
        if !state.products.iter().any(|p| &p.id == product_id) {
            return Err(ApiError::Server {
                status: 404,
                message: "Product doesn't exist".to_string(),
            });
        }
        let position = state.cart.iter().position(|r| &r.product_id == product_id);
        match (position, quantity) {
            (Some(i), 0) => {
                state.cart.remove(i);
            }
            (Some(i), qty) => state.cart[i].quantity = qty,
            (None, 0) => {}
            (None, qty) => state.cart.push(ServerCartRecord::new(product_id.clone(), qty)),
        }
        Ok(state.cart.clone())
    }

    async fn checkout(&self, token: &AuthToken, address_id: &AddressId) -> Result<(), ApiError> {
        let delay = self.state().checkout_delay;
        tokio::time::sleep(delay).await;
        self.record(Call::Checkout(address_id.clone()), Endpoint::Checkout)?;
        Self::authorize(token)?;
        self.state().cart.clear();
        Ok(())
    }
}

impl AddressApi for MockApi {
    async fn list_addresses(&self, token: &AuthToken) -> Result<Vec<Address>, ApiError> {
        self.record(Call::ListAddresses, Endpoint::Addresses)?;
        Self::authorize(token)?;
        Ok(self.state().addresses.clone())
    }

    async fn add_address(&self, token: &AuthToken, text: &str) -> Result<Vec<Address>, ApiError> {
        self.record(Call::AddAddress(text.to_string()), Endpoint::Addresses)?;
        Self::authorize(token)?;
        let mut state = self.state();
        state.next_address += 1;
        let id = AddressId::new(format!("addr-{}", state.next_address));
        state.addresses.push(Address {
            id,
            text: text.to_string(),
        });
        Ok(state.addresses.clone())
    }

    async fn delete_address(
        &self,
        token: &AuthToken,
        id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        self.record(Call::DeleteAddress(id.clone()), Endpoint::Addresses)?;
        Self::authorize(token)?;
        let mut state = self.state();
        state.addresses.retain(|a| &a.id != id);
        Ok(state.addresses.clone())
    }
}

impl AuthApi for MockApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.state().calls.push(Call::Login(username.to_string()));
        if password != TEST_PASSWORD {
            return Err(ApiError::Server {
                status: 400,
                message: "Password is incorrect".to_string(),
            });
        }
        Ok(LoginResponse {
            token: TEST_TOKEN.to_string(),
            username: username.to_string(),
            balance: Price::from_units(5000),
        })
    }

    async fn register(&self, username: &str, _password: &str) -> Result<(), ApiError> {
        self.state().calls.push(Call::Register(username.to_string()));
        if username == "crio.do" {
            return Err(ApiError::Server {
                status: 400,
                message: "Username is already taken".to_string(),
            });
        }
        Ok(())
    }
}
