//! QKart backend API.
//!
//! # Architecture
//!
//! - JSON over HTTP(S) via `reqwest`, bearer-token auth where required
//! - The backend is the source of truth for the cart - no local sync
//! - In-memory caching via `moka` for catalog and search responses
//!
//! The endpoints are grouped into small traits ([`CatalogApi`], [`CartApi`],
//! [`AddressApi`], [`AuthApi`]) so the storefront services can be driven by
//! [`ApiClient`] in production and by an in-memory double in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::api::{ApiClient, CatalogApi};
//!
//! let client = ApiClient::new(&config.api);
//! let products = client.list_products().await?;
//! let phones = client.search_products("phone").await?;
//! ```

mod cache;
mod client;
#[cfg(test)]
pub(crate) mod mock;
pub mod types;

pub use client::ApiClient;
pub use types::LoginResponse;

use std::future::Future;

use thiserror::Error;

use qkart_core::{Address, AddressId, Product, ProductId, ServerCartRecord};

use crate::session::AuthToken;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connection refused, reset, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend answered with a structured error payload.
    #[error("HTTP {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the error payload.
        message: String,
    },

    /// Backend answered with a non-success status and no usable payload.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

impl ApiError {
    /// HTTP status of the response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::UnexpectedStatus(status) => Some(*status),
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => None,
        }
    }

    /// Whether the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// Product catalog endpoints.
pub trait CatalogApi: Send + Sync {
    /// `GET /products`
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `GET /products/search?value=text`
    ///
    /// A "not found" response is an empty result, not an error.
    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;
}

/// Cart and checkout endpoints.
pub trait CartApi: Send + Sync {
    /// `GET /cart`
    fn get_cart(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<Vec<ServerCartRecord>, ApiError>> + Send;

    /// `POST /cart` - returns the full cart after the upsert.
    fn upsert_cart_item(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<Vec<ServerCartRecord>, ApiError>> + Send;

    /// `POST /cart/checkout`
    fn checkout(
        &self,
        token: &AuthToken,
        address_id: &AddressId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Saved address endpoints. Each returns the full list after the change.
pub trait AddressApi: Send + Sync {
    /// `GET /user/addresses`
    fn list_addresses(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send;

    /// `POST /user/addresses`
    fn add_address(
        &self,
        token: &AuthToken,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send;

    /// `DELETE /user/addresses/{id}`
    fn delete_address(
        &self,
        token: &AuthToken,
        id: &AddressId,
    ) -> impl Future<Output = Result<Vec<Address>, ApiError>> + Send;
}

/// Account endpoints.
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `POST /auth/register`
    fn register(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
