//! Shopping cart aggregate.
//!
//! The cart is a small reducer: every change goes through [`Cart::apply`]
//! (or one of the named helpers it dispatches to), and each returns whether
//! the cart actually changed. Invalid quantities are clamped or ignored,
//! never reported as errors.
//!
//! Totals are always computed from the entries; nothing derived is stored.
//!
//! # Invariants
//!
//! - At most one entry per product ID, in insertion order.
//! - Every entry has `1 <= quantity <= product.in_stock` as of its last
//!   mutation.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// One product/quantity pairing inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    product: Product,
    quantity: u32,
}

impl CartEntry {
    /// The product snapshot taken when the entry was last mutated.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Units of the product in the cart.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    /// Returns `true` if another unit could be added without exceeding stock.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.product.in_stock
    }
}

/// A mutation request against a [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add units of a product, merging with an existing entry.
    Add { product: Product, quantity: u32 },
    /// Set the quantity of an existing entry.
    UpdateQuantity { product_id: ProductId, quantity: u32 },
    /// Drop an entry.
    Remove { product_id: ProductId },
    /// Drop every entry.
    Clear,
}

/// The shopping cart.
///
/// Serializes as a JSON array of `{product, quantity}` objects. Deserializing
/// replays every entry through [`Cart::add_item`], so restored data that
/// violates the invariants (duplicates, zero quantities, quantities above
/// stock) is repaired rather than trusted.
///
/// ```
/// use dapur_core::{Cart, Price, Product, ProductId};
///
/// let nasi = Product {
///     id: ProductId::new("A"),
///     name: "Nasi Goreng".into(),
///     description: String::new(),
///     price: Price::new(10_000),
///     category: "Makanan".into(),
///     in_stock: 5,
///     featured: false,
///     image: String::new(),
/// };
///
/// let mut cart = Cart::new();
/// cart.add_item(nasi.clone(), 2);
/// cart.add_item(nasi, 4);
///
/// assert_eq!(cart.total_items(), 5);
/// assert_eq!(cart.total_price(), Price::new(50_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Apply a mutation. Returns `true` if the cart changed.
    pub fn apply(&mut self, action: CartAction) -> bool {
        match action {
            CartAction::Add { product, quantity } => self.add_item(product, quantity),
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(&product_id, quantity),
            CartAction::Remove { product_id } => self.remove_item(&product_id),
            CartAction::Clear => self.clear(),
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// A new entry starts at `min(quantity, in_stock)`; an existing entry is
    /// incremented and capped at `in_stock`, and its snapshot is replaced by
    /// the newer `product`. Does nothing if `quantity` is zero or the product
    /// is out of stock.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> bool {
        if quantity < 1 || product.in_stock < 1 {
            return false;
        }

        let stock = product.in_stock;
        if let Some(entry) = self.entry_mut(&product.id) {
            let next = entry.quantity.saturating_add(quantity).min(stock);
            let changed = next != entry.quantity || entry.product != product;
            entry.quantity = next;
            entry.product = product;
            return changed;
        }

        self.entries.push(CartEntry {
            product,
            quantity: quantity.min(stock),
        });
        true
    }

    /// Set the quantity of an existing entry, clamped to `[1, in_stock]`.
    ///
    /// A quantity of zero is ignored: removing an entry is always explicit.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }

        let Some(entry) = self.entry_mut(product_id) else {
            return false;
        };

        let next = quantity.clamp(1, entry.product.in_stock.max(1));
        if next == entry.quantity {
            return false;
        }
        entry.quantity = next;
        true
    }

    /// Remove the entry for `product_id`, if any.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.product.id != product_id);
        self.entries.len() != before
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        self.entries.clear();
        true
    }

    /// Sum of all entry quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, entry| acc.saturating_add(entry.quantity))
    }

    /// Sum of `quantity * unit price` over all entries.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn entry(&self, product_id: &ProductId) -> Option<&CartEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.product.id == product_id)
    }

    /// Quantity of a product in the cart (zero if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.entry(product_id).map_or(0, CartEntry::quantity)
    }

    /// How many more units of `product` could be added before hitting stock.
    #[must_use]
    pub fn remaining_for(&self, product: &Product) -> u32 {
        product
            .in_stock
            .saturating_sub(self.quantity_of(&product.id))
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, product_id: &ProductId) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|entry| &entry.product.id == product_id)
    }
}

impl From<Vec<CartEntry>> for Cart {
    fn from(entries: Vec<CartEntry>) -> Self {
        let mut cart = Self::new();
        for entry in entries {
            cart.add_item(entry.product, entry.quantity);
        }
        cart
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: u64, in_stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::new(price),
            category: "Makanan".to_string(),
            in_stock,
            featured: false,
            image: String::new(),
        }
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = Cart::new();
        assert!(cart.add_item(product("A", 10_000, 5), 2));

        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price(), Price::new(20_000));
    }

    #[test]
    fn test_add_same_product_twice_clamps_to_stock() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 10_000, 5), 2);
        cart.add_item(product("A", 10_000, 5), 4);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(&ProductId::new("A")), 5);
    }

    #[test]
    fn test_add_new_entry_clamps_to_stock() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 1_000, 3), 10);
        assert_eq!(cart.quantity_of(&ProductId::new("A")), 3);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(product("A", 1_000, 3), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_out_of_stock_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(product("A", 1_000, 0), 1));
        assert!(cart.is_empty());

        cart.add_item(product("B", 1_000, 2), 1);
        assert!(!cart.add_item(product("B", 1_000, 0), 1));
        assert_eq!(cart.quantity_of(&ProductId::new("B")), 1);
    }

    #[test]
    fn test_add_at_stock_limit_reports_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 1_000, 2), 2);
        assert!(!cart.add_item(product("A", 1_000, 2), 1));
    }

    #[test]
    fn test_add_refreshes_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 1_000, 2), 1);
        cart.add_item(product("A", 1_500, 8), 3);

        let entry = cart.entry(&ProductId::new("A")).unwrap();
        assert_eq!(entry.quantity(), 4);
        assert_eq!(entry.product().price, Price::new(1_500));
        assert_eq!(entry.product().in_stock, 8);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(product("B", 1, 9), 1);
        cart.add_item(product("A", 1, 9), 1);
        cart.add_item(product("B", 1, 9), 1);

        let ids: Vec<&str> = cart.iter_ids();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 2_000, 4), 1);
        let id = ProductId::new("A");

        assert!(cart.update_quantity(&id, 3));
        assert_eq!(cart.quantity_of(&id), 3);

        assert!(cart.update_quantity(&id, 99));
        assert_eq!(cart.quantity_of(&id), 4);
        assert_eq!(cart.total_price(), Price::new(8_000));
    }

    #[test]
    fn test_update_quantity_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 2_000, 4), 2);
        let id = ProductId::new("A");

        assert!(!cart.update_quantity(&id, 0));
        assert_eq!(cart.quantity_of(&id), 2);
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 2_000, 4), 2);
        let before = cart.clone();

        assert!(!cart.update_quantity(&ProductId::new("Z"), 3));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 2_000, 4), 2);
        cart.add_item(product("B", 3_000, 4), 1);

        assert!(cart.remove_item(&ProductId::new("A")));
        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.total_price(), Price::new(3_000));

        let before = cart.clone();
        assert!(!cart.remove_item(&ProductId::new("A")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 2_000, 4), 2);
        cart.add_item(product("B", 3_000, 4), 1);

        assert!(cart.clear());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Price::ZERO);
        assert!(cart.entries().is_empty());
        assert!(!cart.clear());
    }

    #[test]
    fn test_apply_dispatches() {
        let mut cart = Cart::new();
        let id = ProductId::new("A");

        assert!(cart.apply(CartAction::Add {
            product: product("A", 500, 10),
            quantity: 2,
        }));
        assert!(cart.apply(CartAction::UpdateQuantity {
            product_id: id.clone(),
            quantity: 7,
        }));
        assert_eq!(cart.total_items(), 7);
        assert!(cart.apply(CartAction::Remove { product_id: id }));
        assert!(!cart.apply(CartAction::Clear));
    }

    #[test]
    fn test_remaining_for() {
        let mut cart = Cart::new();
        let a = product("A", 500, 10);
        assert_eq!(cart.remaining_for(&a), 10);
        cart.add_item(a.clone(), 7);
        assert_eq!(cart.remaining_for(&a), 3);
        assert!(cart.entry(&a.id).unwrap().can_increment());
    }

    #[test]
    fn test_serialized_layout_is_entry_array() {
        let mut cart = Cart::new();
        cart.add_item(product("A", 10_000, 5), 2);

        let value = serde_json::to_value(&cart).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["quantity"], 2);
        assert_eq!(entries[0]["product"]["_id"], "A");
        assert_eq!(entries[0]["product"]["inStock"], 5);
    }

    #[test]
    fn test_deserialize_repairs_invalid_entries() {
        let json = r#"[
            {"product": {"_id": "A", "name": "A", "price": 100, "inStock": 3}, "quantity": 2},
            {"product": {"_id": "A", "name": "A", "price": 100, "inStock": 3}, "quantity": 2},
            {"product": {"_id": "B", "name": "B", "price": 100, "inStock": 0}, "quantity": 1},
            {"product": {"_id": "C", "name": "C", "price": 100, "inStock": 4}, "quantity": 0},
            {"product": {"_id": "D", "name": "D", "price": 100, "inStock": 4}, "quantity": 9}
        ]"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.iter_ids(), vec!["A", "D"]);
        assert_eq!(cart.quantity_of(&ProductId::new("A")), 3);
        assert_eq!(cart.quantity_of(&ProductId::new("D")), 4);
    }

    impl Cart {
        fn iter_ids(&self) -> Vec<&str> {
            self.entries.iter().map(|e| e.product.id.as_str()).collect()
        }
    }
}
