//! Shipping address types.

use serde::{Deserialize, Serialize};

use super::AddressId;

/// Errors from local address bookkeeping.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address text is blank.
    #[error("Address cannot be empty")]
    Empty,
    /// No address with this ID exists in the collection.
    #[error("Unknown address: {0}")]
    Unknown(AddressId),
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    /// Full address string.
    #[serde(rename = "address")]
    pub text: String,
}

/// All saved addresses plus the one chosen for shipping.
///
/// ## Invariant
///
/// `selected`, when set, always refers to an entry in `entries`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCollection {
    entries: Vec<Address>,
    selected: Option<AddressId>,
}

impl AddressCollection {
    /// Create a collection with nothing selected.
    #[must_use]
    pub const fn new(entries: Vec<Address>) -> Self {
        Self {
            entries,
            selected: None,
        }
    }

    /// Saved addresses, in server order.
    #[must_use]
    pub fn entries(&self) -> &[Address] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ID of the selected shipping address.
    #[must_use]
    pub const fn selected(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    /// The selected shipping address.
    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.selected.as_ref()?;
        self.entries.iter().find(|a| &a.id == id)
    }

    /// Choose the shipping address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::Unknown` if `id` is not in the collection.
    pub fn select(&mut self, id: &AddressId) -> Result<(), AddressError> {
        if !self.entries.iter().any(|a| &a.id == id) {
            return Err(AddressError::Unknown(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Replace the entries with a fresh list from the server.
    ///
    /// The selection survives only if the selected address is still present.
    pub fn replace_entries(&mut self, entries: Vec<Address>) {
        self.entries = entries;
        if let Some(id) = &self.selected
            && !self.entries.iter().any(|a| &a.id == id)
        {
            self.selected = None;
        }
    }
}
