//! Unified error handling for storefront actions.
//!
//! Every service returns `Result<T, StorefrontError>`. Backend failures are
//! converted where the call is made with [`StorefrontError::from_api`], and
//! [`StorefrontError::notice`] turns any error into the message the user sees.

use thiserror::Error;

use qkart_core::{AddressError, CheckoutRejection, CredentialError, Notice, ProductId};

use crate::api::ApiError;
use crate::session::SessionError;

/// A user action that talks to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FetchProducts,
    SearchProducts,
    FetchCart,
    UpdateCart,
    FetchAddresses,
    AddAddress,
    DeleteAddress,
    PlaceOrder,
    Login,
    Register,
}

impl Action {
    /// Phrase completing "Could not ...".
    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::FetchProducts | Self::SearchProducts => "fetch products",
            Self::FetchCart => "fetch cart details",
            Self::UpdateCart => "update cart",
            Self::FetchAddresses => "fetch addresses",
            Self::AddAddress => "add this address",
            Self::DeleteAddress => "delete this address",
            Self::PlaceOrder => "place order",
            Self::Login => "log in",
            Self::Register => "register",
        }
    }

    /// Prompt shown when the action needs a logged-in user.
    #[must_use]
    pub const fn login_prompt(self) -> &'static str {
        match self {
            Self::UpdateCart => "Login to add an item to the Cart",
            Self::FetchCart => "Login to view your cart",
            Self::PlaceOrder => "You must be logged in to access checkout page",
            Self::FetchAddresses | Self::AddAddress | Self::DeleteAddress => {
                "Login to manage your addresses"
            }
            Self::FetchProducts | Self::SearchProducts | Self::Login | Self::Register => {
                "Login to continue"
            }
        }
    }
}

/// Local validation failures. The request never left the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error(transparent)]
    Checkout(#[from] CheckoutRejection),

    #[error("Item already in cart. Use the cart sidebar to update quantity or remove item.")]
    DuplicateItem(ProductId),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Storefront error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Action needs a logged-in user and there is no token.
    #[error("{}", .0.login_prompt())]
    Unauthenticated(Action),

    /// Input rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// Backend answered with its error payload; the message is shown as-is.
    #[error("{message}")]
    Server {
        action: Action,
        status: u16,
        message: String,
    },

    /// No usable answer from the backend.
    #[error(
        "Could not {}. Check that the backend is running, reachable and returns valid JSON.",
        .action.phrase()
    )]
    Transport {
        action: Action,
        #[source]
        source: ApiError,
    },

    /// The same action is already pending.
    #[error("Please wait, still trying to {}.", .0.phrase())]
    InFlight(Action),

    /// Session could not be persisted.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl StorefrontError {
    /// Classify a backend failure for `action`.
    #[must_use]
    pub fn from_api(action: Action, err: ApiError) -> Self {
        match err {
            ApiError::Server { status, message } => Self::Server {
                action,
                status,
                message,
            },
            source @ (ApiError::Http(_)
            | ApiError::Parse(_)
            | ApiError::Url(_)
            | ApiError::UnexpectedStatus(_)) => {
                tracing::error!(action = ?action, error = %source, "Backend request failed");
                Self::Transport { action, source }
            }
        }
    }

    /// The notice to show the user for this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(_) => Notice::warning(self.to_string()),
            Self::Unauthenticated(_) | Self::InFlight(_) => Notice::info(self.to_string()),
            Self::Server { .. } | Self::Transport { .. } | Self::Session(_) => {
                Notice::error(self.to_string())
            }
        }
    }
}

impl From<CheckoutRejection> for StorefrontError {
    fn from(rejection: CheckoutRejection) -> Self {
        Self::Validation(rejection.into())
    }
}

impl From<CredentialError> for StorefrontError {
    fn from(err: CredentialError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<AddressError> for StorefrontError {
    fn from(err: AddressError) -> Self {
        Self::Validation(err.into())
    }
}
