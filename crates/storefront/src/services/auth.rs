//! Authentication service.
//!
//! Validates login and registration input locally, then talks to the
//! backend. A successful login starts the session; logout ends it.

use std::sync::Arc;

use tracing::{info, instrument};

use qkart_core::{LoginCredentials, Registration};

use crate::api::AuthApi;
use crate::error::{Action, StorefrontError};
use crate::session::{AuthToken, Session, SessionStart, SessionUpdate};

/// Login, registration and logout.
pub struct AuthService<A> {
    api: Arc<A>,
    session: Session,
}

impl<A> Clone for AuthService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
        }
    }
}

impl<A: AuthApi> AuthService<A> {
    #[must_use]
    pub const fn new(api: Arc<A>, session: Session) -> Self {
        Self { api, session }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Log in and start a session.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure::Credentials` for blank fields (no request
    /// is made), the backend failure (e.g. "Password is incorrect"), or
    /// `StorefrontError::Session` if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), StorefrontError> {
        let credentials = LoginCredentials::parse(username, password)?;

        let response = self
            .api
            .login(&credentials.username, &credentials.password)
            .await
            .map_err(|e| StorefrontError::from_api(Action::Login, e))?;

        self.session.apply(SessionUpdate::Start(SessionStart {
            token: AuthToken::new(response.token),
            username: response.username,
            balance: response.balance,
        }))?;

        info!("Logged in");
        Ok(())
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure::Credentials` for input that fails local
    /// checks (no request is made), or the backend failure (e.g. "Username
    /// is already taken").
    #[instrument(skip(self, password, confirm))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), StorefrontError> {
        let registration = Registration::parse(username, password, confirm)?;

        self.api
            .register(&registration.username, &registration.password)
            .await
            .map_err(|e| StorefrontError::from_api(Action::Register, e))?;

        info!("Registered");
        Ok(())
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Session` if the session cannot be saved.
    pub fn logout(&self) -> Result<(), StorefrontError> {
        self.session.apply(SessionUpdate::End)?;
        info!("Logged out");
        Ok(())
    }
}
