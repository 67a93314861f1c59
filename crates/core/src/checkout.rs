//! Checkout precondition validation.
//!
//! Checks run in a fixed order and stop at the first failure, which decides
//! the single warning the user sees:
//!
//! 1. wallet balance covers the cart total
//! 2. at least one address is saved
//! 3. a shipping address is selected
//!
//! Failures are advisory. Nothing is mutated.

use thiserror::Error;

use crate::cart::total_cart_value;
use crate::types::{AddressCollection, CartItem, Price};

/// Why an order cannot be placed yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutRejection {
    #[error("You do not have enough balance in your wallet for this purchase")]
    InsufficientFunds {
        /// Current wallet balance.
        balance: Price,
        /// Cart total that would be debited.
        total: Price,
    },
    #[error("Please add a new address before proceeding.")]
    NoAddress,
    #[error("Please select one shipping address to proceed.")]
    NoAddressSelected,
}

/// Validate that an order can be placed.
///
/// # Errors
///
/// Returns the first failing [`CheckoutRejection`].
pub fn validate(
    items: &[CartItem],
    balance: Price,
    addresses: &AddressCollection,
) -> Result<(), CheckoutRejection> {
    let total = total_cart_value(items);
    if balance < total {
        return Err(CheckoutRejection::InsufficientFunds { balance, total });
    }

    if addresses.is_empty() {
        return Err(CheckoutRejection::NoAddress);
    }

    if addresses.selected().is_none() {
        return Err(CheckoutRejection::NoAddressSelected);
    }

    Ok(())
}
