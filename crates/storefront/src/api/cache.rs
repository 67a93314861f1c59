//! Cache types for catalog responses.

/// Cache key for catalog listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// `GET /products`
    Catalog,
    /// `GET /products/search?value=...`
    Search(String),
}
