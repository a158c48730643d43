//! Client for the Dapur backend REST API.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest`; every response is wrapped in a
//!   `{ success, data, message }` envelope
//! - The backend is the source of truth for products, stock and orders
//! - Product and category responses are cached in memory via `moka`
//!
//! # Endpoints
//!
//! ## Catalog (public)
//! - `GET /api/products` with `search`, `category`, `featured`, `limit`
//! - `GET /api/products/categories`
//! - `GET /api/products/{id}`
//!
//! ## Orders (bearer token)
//! - `POST /api/orders`
//! - `GET /api/orders/myorders`
//! - `GET /api/orders/{id}`
//!
//! # Example
//!
//! ```rust,ignore
//! use dapur_storefront::backend::{BackendClient, ProductQuery};
//!
//! let client = BackendClient::new(&config.backend)?;
//!
//! let featured = client
//!     .list_products(&ProductQuery::new().featured(true).limit(4))
//!     .await?;
//! ```

mod cache;
mod client;
mod types;

pub use client::BackendClient;
pub use types::ProductQuery;

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot have path segments appended.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The bearer token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An authenticated endpoint was called without a token configured.
    #[error("No API token configured")]
    MissingToken,

    /// The backend answered with an error status or `success: false`.
    #[error("Backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The backend's `message` field, or a truncated body.
        message: String,
    },
}

impl BackendError {
    /// Returns `true` if the failure is on our side or the backend's rather
    /// than caused by the request contents.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) | Self::MissingToken => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Unauthorized(_) => false,
        }
    }

    /// Message safe to show to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if *status < 500 && !message.is_empty() => {
                message.clone()
            }
            Self::NotFound(_) => "Not found".to_string(),
            Self::Unauthorized(_) | Self::MissingToken => "Please sign in again".to_string(),
            _ => "External service error".to_string(),
        }
    }
}
