//! Persisted login session.
//!
//! The session is a small key/value store holding the bearer token, the
//! username and the wallet balance. It outlives a single run: the CLI keeps
//! it in a JSON file, tests keep it in memory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::warn;

use qkart_core::Price;

/// Session keys for authentication data.
pub mod keys {
    /// Bearer token returned by the backend on login.
    pub const TOKEN: &str = "token";

    /// Username of the logged-in user.
    pub const USERNAME: &str = "username";

    /// Wallet balance, as a decimal string.
    pub const BALANCE: &str = "balance";
}

/// Errors from the session backing store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// AuthToken
// =============================================================================

/// Opaque bearer token. Never printed.
pub struct AuthToken(SecretString);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for AuthToken {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

// =============================================================================
// Backing stores
// =============================================================================

/// Key/value storage behind a [`Session`].
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns `SessionError` if the change cannot be persisted.
    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError>;

    /// # Errors
    ///
    /// Returns `SessionError` if the change cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// Session store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: BTreeMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Session store persisted as a flat JSON object.
///
/// The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSessionStore {
    /// Open the store at `path`. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<(), SessionError> {
        if self.values.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

/// Data recorded when a user logs in.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub token: AuthToken,
    pub username: String,
    pub balance: Price,
}

/// A change to the session.
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// Successful login.
    Start(SessionStart),
    /// Order placed; lower the balance by the order total.
    Debit(Price),
    /// Logout.
    End,
}

/// Shared handle to the session. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    store: Arc<Mutex<Box<dyn SessionStore>>>,
}

impl Session {
    #[must_use]
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// A session that is not persisted anywhere.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::default())
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut dyn SessionStore) -> R) -> R {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(store.as_mut())
    }

    /// Bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.with_store(|store| store.get(keys::TOKEN))
            .filter(|token| !token.is_empty())
            .map(AuthToken::new)
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.with_store(|store| store.get(keys::USERNAME))
    }

    /// Wallet balance. Missing or unreadable values count as zero.
    #[must_use]
    pub fn balance(&self) -> Price {
        self.with_store(|store| stored_balance(store))
    }

    /// Apply a change to the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing store cannot persist the change.
    pub fn apply(&self, update: SessionUpdate) -> Result<(), SessionError> {
        match update {
            SessionUpdate::Start(start) => self.with_store(|store| {
                store.set(keys::TOKEN, start.token.expose().to_string())?;
                store.set(keys::USERNAME, start.username)?;
                store.set(keys::BALANCE, start.balance.to_string())
            }),
            SessionUpdate::Debit(amount) => self.with_store(|store| {
                let remaining = stored_balance(store).saturating_sub(amount);
                store.set(keys::BALANCE, remaining.to_string())
            }),
            SessionUpdate::End => self.with_store(|store| {
                store.remove(keys::TOKEN)?;
                store.remove(keys::USERNAME)?;
                store.remove(keys::BALANCE)
            }),
        }
    }
}

fn stored_balance(store: &dyn SessionStore) -> Price {
    let Some(raw) = store.get(keys::BALANCE) else {
        return Price::ZERO;
    };
    raw.parse().unwrap_or_else(|e| {
        warn!(value = %raw, error = %e, "Ignoring unreadable session balance");
        Price::ZERO
    })
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username())
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
