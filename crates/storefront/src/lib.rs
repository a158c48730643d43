//! Dapur storefront library.
//!
//! Everything a customer-facing front end needs on top of `dapur-core`:
//! the backend REST client, the persisted cart store and checkout. The CLI
//! and the integration tests both drive the storefront through this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod checkout;
pub mod config;
pub mod error;
pub mod persistence;
pub mod state;
pub mod store;
