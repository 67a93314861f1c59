//! HTTP implementation of the backend API.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use qkart_core::{Address, AddressId, Product, ProductId, ServerCartRecord};

use super::cache::CacheKey;
use super::types::{
    CheckoutRequest, CredentialsRequest, ErrorBody, LoginResponse, NewAddressRequest,
    UpsertCartRequest,
};
use super::{AddressApi, ApiError, AuthApi, CartApi, CatalogApi};
use crate::config::ApiConfig;
use crate::session::AuthToken;

/// Maximum number of cached catalog listings (full catalog + search queries).
const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the QKart backend.
///
/// Cheap to clone. Catalog and search responses are cached for the
/// configured TTL; cart, address and account calls are never cached.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, Arc<Vec<Product>>>>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.endpoint.clone(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and return the body of a successful response.
    ///
    /// Non-success responses become `ApiError::Server` when they carry the
    /// backend's error payload, `ApiError::UnexpectedStatus` otherwise.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(error) => {
                debug!(status = %status, message = %error.message, "Backend returned an error payload");
                Err(ApiError::Server {
                    status: status.as_u16(),
                    message: error.message,
                })
            }
            Err(_) => {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned non-success status without an error payload"
                );
                Err(ApiError::UnexpectedStatus(status.as_u16()))
            }
        }
    }

    /// Send a request and decode the JSON body of a successful response.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    async fn cached(&self, key: &CacheKey) -> Option<Vec<Product>> {
        let cache = self.inner.cache.as_ref()?;
        let products = cache.get(key).await?;
        debug!(key = ?key, "Cache hit");
        Some(products.as_ref().clone())
    }

    async fn remember(&self, key: CacheKey, products: &[Product]) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, Arc::new(products.to_vec())).await;
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

impl CatalogApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.cached(&CacheKey::Catalog).await {
            return Ok(products);
        }

        let url = self.url("products")?;
        let products: Vec<Product> = self.fetch(self.inner.client.get(url)).await?;

        self.remember(CacheKey::Catalog, &products).await;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Search(text.to_string());
        if let Some(products) = self.cached(&key).await {
            return Ok(products);
        }

        let mut url = self.url("products/search")?;
        url.query_pairs_mut().append_pair("value", text);

        let products = match self.fetch::<Vec<Product>>(self.inner.client.get(url)).await {
            Ok(products) => products,
            Err(e) if e.is_not_found() => {
                debug!("No products matched");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        self.remember(key, &products).await;
        Ok(products)
    }
}

// =============================================================================
// Cart (not cached - mutable state)
// =============================================================================

impl CartApi for ApiClient {
    #[instrument(skip(self, token))]
    async fn get_cart(&self, token: &AuthToken) -> Result<Vec<ServerCartRecord>, ApiError> {
        let url = self.url("cart")?;
        self.fetch(self.inner.client.get(url).bearer_auth(token.expose()))
            .await
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    async fn upsert_cart_item(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<ServerCartRecord>, ApiError> {
        let url = self.url("cart")?;
        let body = UpsertCartRequest {
            product_id,
            quantity,
        };
        self.fetch(
            self.inner
                .client
                .post(url)
                .bearer_auth(token.expose())
                .json(&body),
        )
        .await
    }

    #[instrument(skip(self, token), fields(address_id = %address_id))]
    async fn checkout(&self, token: &AuthToken, address_id: &AddressId) -> Result<(), ApiError> {
        let url = self.url("cart/checkout")?;
        let body = CheckoutRequest { address_id };
        self.execute(
            self.inner
                .client
                .post(url)
                .bearer_auth(token.expose())
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

// =============================================================================
// Addresses
// =============================================================================

impl AddressApi for ApiClient {
    #[instrument(skip(self, token))]
    async fn list_addresses(&self, token: &AuthToken) -> Result<Vec<Address>, ApiError> {
        let url = self.url("user/addresses")?;
        self.fetch(self.inner.client.get(url).bearer_auth(token.expose()))
            .await
    }

    #[instrument(skip(self, token, text))]
    async fn add_address(&self, token: &AuthToken, text: &str) -> Result<Vec<Address>, ApiError> {
        let url = self.url("user/addresses")?;
        let body = NewAddressRequest { address: text };
        self.fetch(
            self.inner
                .client
                .post(url)
                .bearer_auth(token.expose())
                .json(&body),
        )
        .await
    }

    #[instrument(skip(self, token), fields(address_id = %id))]
    async fn delete_address(
        &self,
        token: &AuthToken,
        id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        let mut url = self.url("user/addresses/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id.as_str());
        self.fetch(self.inner.client.delete(url).bearer_auth(token.expose()))
            .await
    }
}

// =============================================================================
// Accounts
// =============================================================================

impl AuthApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.url("auth/login")?;
        let body = CredentialsRequest { username, password };
        self.fetch(self.inner.client.post(url).json(&body)).await
    }

    #[instrument(skip(self, password))]
    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.url("auth/register")?;
        let body = CredentialsRequest { username, password };
        self.execute(self.inner.client.post(url).json(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(endpoint: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(endpoint, Duration::from_secs(60)).unwrap())
    }

    #[test]
    fn test_paths_join_under_base() {
        let client = client("http://localhost:8082/api/v1");
        assert_eq!(
            client.url("products").unwrap().as_str(),
            "http://localhost:8082/api/v1/products"
        );
        assert_eq!(
            client.url("cart/checkout").unwrap().as_str(),
            "http://localhost:8082/api/v1/cart/checkout"
        );
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let client = ApiClient::new(
            &ApiConfig::new("http://localhost:8082/api/v1", Duration::ZERO).unwrap(),
        );
        assert!(client.inner.cache.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Port 9 (discard) is not listening on test hosts.
        let client = client("http://127.0.0.1:9/api/v1");
        let result = client.list_products().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
        assert_eq!(result.unwrap_err().status(), None);
    }
}
