//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QKART_API_ENDPOINT` - Backend base URL (e.g., `http://localhost:8082/api/v1`)
//!
//! ## Optional
//! - `QKART_SEARCH_DEBOUNCE_MS` - Search quiet period in milliseconds (default: 500)
//! - `QKART_CACHE_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `QKART_SESSION_FILE` - Where the CLI persists the session (default: `.qkart-session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SEARCH_DEBOUNCE_MS: &str = "500";
const DEFAULT_CACHE_TTL_SECS: &str = "300";
const DEFAULT_SESSION_FILE: &str = ".qkart-session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Quiet period before a typed search is dispatched
    pub search_debounce: Duration,
    /// Session file used by the CLI
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Backend API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub endpoint: Url,
    /// How long catalog and search responses stay cached
    pub cache_ttl: Duration,
}

impl ApiConfig {
    /// Build an API configuration for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the endpoint is not an
    /// absolute http(s) URL.
    pub fn new(endpoint: &str, cache_ttl: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            cache_ttl,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = lookup("QKART_API_ENDPOINT")
            .ok_or_else(|| ConfigError::MissingEnvVar("QKART_API_ENDPOINT".to_string()))?;

        let debounce_ms = parse_u64(
            "QKART_SEARCH_DEBOUNCE_MS",
            &lookup("QKART_SEARCH_DEBOUNCE_MS")
                .unwrap_or_else(|| DEFAULT_SEARCH_DEBOUNCE_MS.to_string()),
        )?;
        let cache_ttl_secs = parse_u64(
            "QKART_CACHE_TTL_SECS",
            &lookup("QKART_CACHE_TTL_SECS").unwrap_or_else(|| DEFAULT_CACHE_TTL_SECS.to_string()),
        )?;

        let session_file = lookup("QKART_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);
        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            api: ApiConfig::new(&endpoint, Duration::from_secs(cache_ttl_secs))?,
            search_debounce: Duration::from_millis(debounce_ms),
            session_file,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the backend base URL, normalising it to end with `/`.
fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("QKART_API_ENDPOINT".to_string(), reason);

    let mut url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
