//! QKart storefront library.
//!
//! Client-side storefront logic: backend API client, persisted session,
//! cart and checkout services, and debounced search. Surfaces (the CLI,
//! tests) drive it through [`state::Storefront`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod services;
pub mod session;
pub mod state;

pub use error::{Action, StorefrontError, ValidationFailure};
pub use state::Storefront;
