//! Saved shipping addresses.
//!
//! The backend answers every address call with the full list, which
//! replaces the local entries. Selection is purely local.

use std::sync::Arc;

use tracing::instrument;

use qkart_core::{AddressCollection, AddressError, AddressId};

use crate::api::AddressApi;
use crate::error::{Action, StorefrontError};
use crate::session::{AuthToken, Session};

/// Keeps an [`AddressCollection`] in sync with the backend.
pub struct AddressBook<A> {
    api: Arc<A>,
    session: Session,
}

impl<A> Clone for AddressBook<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
        }
    }
}

impl<A: AddressApi> AddressBook<A> {
    #[must_use]
    pub const fn new(api: Arc<A>, session: Session) -> Self {
        Self { api, session }
    }

    fn token(&self, action: Action) -> Result<AuthToken, StorefrontError> {
        self.session
            .token()
            .ok_or(StorefrontError::Unauthenticated(action))
    }

    /// Replace `addresses` with the saved list.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Unauthenticated` without a session, or the
    /// backend failure.
    #[instrument(skip_all)]
    pub async fn refresh(&self, addresses: &mut AddressCollection) -> Result<(), StorefrontError> {
        let token = self.token(Action::FetchAddresses)?;
        let entries = self
            .api
            .list_addresses(&token)
            .await
            .map_err(|e| StorefrontError::from_api(Action::FetchAddresses, e))?;
        addresses.replace_entries(entries);
        Ok(())
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Empty` for blank text (no request is made),
    /// `StorefrontError::Unauthenticated` without a session, or the backend
    /// failure.
    #[instrument(skip(self, addresses, text))]
    pub async fn add(
        &self,
        addresses: &mut AddressCollection,
        text: &str,
    ) -> Result<(), StorefrontError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AddressError::Empty.into());
        }
        let token = self.token(Action::AddAddress)?;

        let entries = self
            .api
            .add_address(&token, text)
            .await
            .map_err(|e| StorefrontError::from_api(Action::AddAddress, e))?;
        addresses.replace_entries(entries);
        Ok(())
    }

    /// Delete a saved address. Deleting the selected one clears the selection.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Unauthenticated` without a session, or the
    /// backend failure.
    #[instrument(skip(self, addresses), fields(address_id = %id))]
    pub async fn delete(
        &self,
        addresses: &mut AddressCollection,
        id: &AddressId,
    ) -> Result<(), StorefrontError> {
        let token = self.token(Action::DeleteAddress)?;
        let entries = self
            .api
            .delete_address(&token, id)
            .await
            .map_err(|e| StorefrontError::from_api(Action::DeleteAddress, e))?;
        addresses.replace_entries(entries);
        Ok(())
    }
}
