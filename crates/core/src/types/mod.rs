//! Core types for QKart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart_item;
pub mod credential;
pub mod id;
pub mod notice;
pub mod price;
pub mod product;

pub use address::{Address, AddressCollection, AddressError};
pub use cart_item::{CartItem, ServerCartRecord};
pub use credential::{CredentialError, LoginCredentials, Registration};
pub use id::*;
pub use notice::{Notice, NoticeLevel};
pub use price::{Price, PriceError};
pub use product::{Product, Rating, RatingError};
