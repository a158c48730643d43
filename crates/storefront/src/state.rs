//! Application state for one storefront session.

use dapur_core::{CheckoutQuote, Order, PaymentMethod, ProductId};

use crate::backend::{BackendClient, BackendError};
use crate::checkout::{self, CheckoutDetails, CheckoutError};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::persistence::{CartPersistence, JsonFileStorage};
use crate::store::CartStore;

/// Application state: configuration, backend client and the cart.
///
/// Unlike the backend client, the cart is not shared. Whoever holds the
/// state owns the cart and mutates it through `&mut self`.
#[derive(Debug)]
pub struct AppState<P = JsonFileStorage> {
    config: StorefrontConfig,
    backend: BackendClient,
    cart: CartStore<P>,
}

impl AppState<JsonFileStorage> {
    /// Create state backed by the JSON file named in `config.storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let storage = JsonFileStorage::new(&config.storage.data_dir, &config.storage.cart_key);
        tracing::debug!(path = %storage.path().display(), "Using cart file");
        Ok(Self::with_storage(config, storage)?)
    }
}

impl<P: CartPersistence> AppState<P> {
    /// Create state with a caller-supplied cart storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn with_storage(config: StorefrontConfig, storage: P) -> std::result::Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self {
            cart: CartStore::open(storage),
            config,
            backend,
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub const fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<P> {
        &self.cart
    }

    /// The cart store, for mutation.
    pub const fn cart_mut(&mut self) -> &mut CartStore<P> {
        &mut self.cart
    }

    /// Fetch a fresh copy of a product and add it to the cart.
    ///
    /// Returns whether the cart changed; adding an out-of-stock product or
    /// a product already at its stock limit changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched or the cart cannot
    /// be saved.
    pub async fn add_to_cart(&mut self, id: &ProductId, quantity: u32) -> Result<bool> {
        let product = self.backend.refresh_product(id).await?;
        Ok(self.cart.add_item(product, quantity)?)
    }

    /// Price the current cart.
    #[must_use]
    pub fn quote(&self, method: PaymentMethod) -> CheckoutQuote {
        self.cart.quote(method)
    }

    /// Place an order for the cart contents.
    ///
    /// # Errors
    ///
    /// See [`checkout::place_order`].
    pub async fn checkout(
        &mut self,
        details: CheckoutDetails,
    ) -> std::result::Result<Order, CheckoutError> {
        checkout::place_order(&self.backend, &mut self.cart, details).await
    }
}
