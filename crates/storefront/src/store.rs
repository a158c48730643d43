//! Cart store: the single owner of the session's cart.
//!
//! Wraps the pure [`Cart`] reducer with persistence. Every mutation runs
//! synchronously and, when it changed the cart, writes the new state to
//! storage before returning. The store is passed explicitly to whoever
//! needs it; there is no global cart.

use dapur_core::{Cart, CartAction, CheckoutQuote, PaymentMethod, Price, Product, ProductId};
use tracing::{debug, warn};

use crate::error::add_breadcrumb;
use crate::persistence::{CartPersistence, PersistenceError, restore_or_empty};

/// Owned, persisted shopping cart.
#[derive(Debug)]
pub struct CartStore<P> {
    cart: Cart,
    storage: P,
}

impl<P: CartPersistence> CartStore<P> {
    /// Open the store, restoring whatever cart `storage` holds.
    ///
    /// Missing or unreadable data yields an empty cart.
    pub fn open(storage: P) -> Self {
        let cart = restore_or_empty(&storage);
        Self { cart, storage }
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sum of all entry quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    /// Sum of `quantity * unit price`.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    /// Price the current cart for a payment method.
    #[must_use]
    pub fn quote(&self, method: PaymentMethod) -> CheckoutQuote {
        CheckoutQuote::new(&self.cart, method)
    }

    /// The persistence backend.
    #[must_use]
    pub const fn storage(&self) -> &P {
        &self.storage
    }

    /// Add units of a product. See [`Cart::add_item`] for clamping rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart could not be persisted. The
    /// in-memory change is kept.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> Result<bool, PersistenceError> {
        self.dispatch(CartAction::Add { product, quantity })
    }

    /// Set an entry's quantity. See [`Cart::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart could not be persisted.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<bool, PersistenceError> {
        self.dispatch(CartAction::UpdateQuantity {
            product_id: product_id.clone(),
            quantity,
        })
    }

    /// Remove an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart could not be persisted.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<bool, PersistenceError> {
        self.dispatch(CartAction::Remove {
            product_id: product_id.clone(),
        })
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart could not be persisted.
    pub fn clear(&mut self) -> Result<bool, PersistenceError> {
        self.dispatch(CartAction::Clear)
    }

    /// Apply a mutation and persist the result if anything changed.
    ///
    /// Returns whether the cart changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the changed cart could not be persisted. The
    /// in-memory change is kept either way.
    pub fn dispatch(&mut self, action: CartAction) -> Result<bool, PersistenceError> {
        let summary = describe(&action);
        if !self.cart.apply(action) {
            debug!(action = %summary, "Cart unchanged");
            return Ok(false);
        }

        add_breadcrumb("cart", &summary, None);
        debug!(
            action = %summary,
            total_items = self.cart.total_items(),
            total_price = self.cart.total_price().amount(),
            "Cart updated"
        );

        if let Err(e) = self.storage.persist(&self.cart) {
            warn!(error = %e, "Failed to persist cart");
            return Err(e);
        }
        Ok(true)
    }
}

fn describe(action: &CartAction) -> String {
    match action {
        CartAction::Add { product, quantity } => format!("add {} x{quantity}", product.id),
        CartAction::UpdateQuantity {
            product_id,
            quantity,
        } => format!("set {product_id} x{quantity}"),
        CartAction::Remove { product_id } => format!("remove {product_id}"),
        CartAction::Clear => "clear".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::persistence::MemoryStorage;

    fn product(id: &str, price: u64, in_stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Menu {id}"),
            description: String::new(),
            price: Price::new(price),
            category: "Minuman".to_string(),
            in_stock,
            featured: false,
            image: String::new(),
        }
    }

    /// Storage whose writes always fail.
    struct BrokenStorage;

    impl CartPersistence for BrokenStorage {
        fn restore(&self) -> Result<Option<Cart>, PersistenceError> {
            Ok(None)
        }

        fn persist(&mut self, _cart: &Cart) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io {
                path: PathBuf::from("/dev/full"),
                source: io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn test_open_empty() {
        let store = CartStore::open(MemoryStorage::new());
        assert!(store.cart().is_empty());
        assert_eq!(store.total_items(), 0);
    }

    #[test]
    fn test_open_restores_saved_cart() {
        let mut saved = Cart::new();
        saved.add_item(product("A", 10_000, 5), 3);

        let store = CartStore::open(MemoryStorage::with_cart(&saved).unwrap());
        assert_eq!(store.cart(), &saved);
        assert_eq!(store.total_price(), Price::new(30_000));
    }

    #[test]
    fn test_mutations_persist() {
        let mut store = CartStore::open(MemoryStorage::new());
        let id = ProductId::new("A");

        assert!(store.add_item(product("A", 10_000, 5), 2).unwrap());
        assert!(store.update_quantity(&id, 4).unwrap());
        assert!(store.remove_item(&id).unwrap());
        assert_eq!(store.storage().writes(), 3);

        let saved = store.storage().restore().unwrap().unwrap();
        assert_eq!(&saved, store.cart());
    }

    #[test]
    fn test_noop_mutations_do_not_persist() {
        let mut store = CartStore::open(MemoryStorage::new());

        assert!(!store.add_item(product("A", 10_000, 5), 0).unwrap());
        assert!(!store.update_quantity(&ProductId::new("A"), 3).unwrap());
        assert!(!store.remove_item(&ProductId::new("A")).unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.storage().writes(), 0);
    }

    #[test]
    fn test_persisted_state_survives_reopen() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add_item(product("A", 10_000, 5), 2).unwrap();
        store.add_item(product("B", 4_000, 1), 3).unwrap();

        let reopened = CartStore::open(store.storage().clone());
        assert_eq!(reopened.total_items(), 3);
        assert_eq!(reopened.total_price(), Price::new(24_000));
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add_item(product("A", 10_000, 5), 2).unwrap();

        assert!(store.clear().unwrap());
        assert_eq!(store.total_items(), 0);
        assert_eq!(store.total_price(), Price::ZERO);
        assert_eq!(store.storage().raw(), Some("[]"));
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_change() {
        let mut store = CartStore::open(BrokenStorage);

        let result = store.add_item(product("A", 10_000, 5), 2);
        assert!(matches!(result, Err(PersistenceError::Io { .. })));
        assert_eq!(store.total_items(), 2);
    }

    #[test]
    fn test_quote_uses_current_cart() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add_item(product("A", 10_000, 5), 2).unwrap();

        let quote = store.quote(PaymentMethod::Cod);
        assert_eq!(quote.total_price, Price::new(25_000));
    }
}
