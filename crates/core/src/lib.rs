//! Dapur Core - Shared types and cart logic.
//!
//! This crate provides the domain types used across all Dapur components:
//! - `storefront` - Client-side orchestration (cart store, backend client, checkout)
//! - `cli` - Command-line front end for browsing, cart and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP clients. The cart is a reducer over [`CartAction`]s, so it can be
//! tested without any storage backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and statuses
//! - [`product`] - Product snapshot as served by the backend
//! - [`cart`] - Cart aggregate and its reducer
//! - [`pricing`] - Shipping cost and grand total derivation
//! - [`order`] - Order submission payload and order model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod pricing;
pub mod product;
pub mod types;

pub use cart::{Cart, CartAction, CartEntry};
pub use order::{Order, OrderError, OrderLine, OrderSubmission, ShippingAddress};
pub use pricing::{CheckoutQuote, grand_total, shipping_cost};
pub use product::Product;
pub use types::*;
