//! Order placement.

use std::sync::Arc;

use tracing::{error, info, instrument};

use qkart_core::{AddressCollection, CartItem, CheckoutRejection, Price, total_cart_value, validate};

use super::ActionGuard;
use crate::api::CartApi;
use crate::error::{Action, StorefrontError};
use crate::session::{Session, SessionUpdate};

/// Result of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Amount debited from the wallet.
    pub total: Price,
    /// Wallet balance after the debit.
    pub remaining_balance: Price,
}

/// Places orders for the logged-in user.
pub struct CheckoutExecutor<A> {
    api: Arc<A>,
    session: Session,
    guard: Arc<ActionGuard>,
}

impl<A> Clone for CheckoutExecutor<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<A: CartApi> CheckoutExecutor<A> {
    #[must_use]
    pub fn new(api: Arc<A>, session: Session) -> Self {
        Self {
            api,
            session,
            guard: Arc::new(ActionGuard::new(Action::PlaceOrder)),
        }
    }

    /// Check whether `items` can be ordered to the selected address.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`CheckoutRejection`].
    pub fn check(
        &self,
        items: &[CartItem],
        addresses: &AddressCollection,
    ) -> Result<(), CheckoutRejection> {
        validate(items, self.session.balance(), addresses)
    }

    /// Place an order for `items`, shipping to the selected address.
    ///
    /// Validation runs before anything else. On success the wallet balance
    /// in the session is lowered by the order total; `items` is left as is.
    /// Once the backend accepts the order a receipt is always returned, even
    /// if the new balance cannot be saved.
    ///
    /// # Errors
    ///
    /// - `StorefrontError::Validation` if a checkout precondition fails
    /// - `StorefrontError::Unauthenticated` if there is no session
    /// - `StorefrontError::InFlight` if an order is already being placed
    /// - `StorefrontError::Server` / `StorefrontError::Transport` if the
    ///   backend rejects or cannot be reached
    #[instrument(skip_all, fields(lines = items.len()))]
    pub async fn place_order(
        &self,
        items: &[CartItem],
        addresses: &AddressCollection,
    ) -> Result<OrderReceipt, StorefrontError> {
        self.check(items, addresses)?;

        let token = self
            .session
            .token()
            .ok_or(StorefrontError::Unauthenticated(Action::PlaceOrder))?;
        let address_id = addresses
            .selected()
            .ok_or(CheckoutRejection::NoAddressSelected)?;

        let _pending = self.guard.try_acquire()?;

        let total = total_cart_value(items);
        self.api
            .checkout(&token, address_id)
            .await
            .map_err(|e| StorefrontError::from_api(Action::PlaceOrder, e))?;

        // The order is placed at this point. A balance that cannot be saved
        // is logged, never reported as a failed order.
        let before = self.session.balance();
        let remaining_balance = match self.session.apply(SessionUpdate::Debit(total)) {
            Ok(()) => self.session.balance(),
            Err(e) => {
                error!(error = %e, "Order placed but the new wallet balance could not be saved");
                before.saturating_sub(total)
            }
        };

        info!(total = %total, remaining = %remaining_balance, "Order placed");
        Ok(OrderReceipt {
            total,
            remaining_balance,
        })
    }
}
