//! QKart Core - Shared types and pure storefront logic.
//!
//! This crate provides the types used across all QKart components:
//! - `storefront` - API client, session and screen services
//! - `cli` - Command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. Cart reconciliation and checkout validation live here
//! so that every consumer computes totals and preconditions the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, products, carts, addresses
//! - [`cart`] - Reconciliation of server cart records with the catalog
//! - [`checkout`] - Checkout precondition validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{item_count, reconcile, total_cart_value};
pub use checkout::{CheckoutRejection, validate};
pub use types::*;
