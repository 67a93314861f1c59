//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Login, registration and logout
//! - `cart` - Loading and mutating the server-side cart
//! - `checkout` - Validating and placing an order
//! - `addresses` - Keeping the saved address list in sync
//! - `search` - Debounced catalog search
//!
//! Services are generic over the API traits in [`crate::api`] and share the
//! [`Session`](crate::session::Session) handle they are built with.

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod search;

pub use addresses::AddressBook;
pub use auth::AuthService;
pub use cart::{CartMutator, UpsertOptions};
pub use checkout::{CheckoutExecutor, OrderReceipt};
pub use search::{Listing, SearchDebouncer};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Action, StorefrontError};

/// Rejects a second submission of an action while the first is pending.
#[derive(Debug)]
pub struct ActionGuard {
    action: Action,
    busy: AtomicBool,
}

impl ActionGuard {
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            busy: AtomicBool::new(false),
        }
    }

    /// Mark the action as pending until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::InFlight` if the action is already pending.
    pub fn try_acquire(&self) -> Result<InFlight<'_>, StorefrontError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight { guard: self })
            .map_err(|_| StorefrontError::InFlight(self.action))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// A pending action. Releases its [`ActionGuard`] on drop.
#[derive(Debug)]
pub struct InFlight<'a> {
    guard: &'a ActionGuard,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}
