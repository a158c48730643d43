//! Cart commands.
//!
//! The cart lives in `DAPUR_DATA_DIR` and survives between invocations.
//!
//! # Usage
//!
//! ```bash
//! dapur cart add 665f1c2b9a -q 2
//! dapur cart update 665f1c2b9a 3
//! dapur cart remove 665f1c2b9a
//! dapur cart show --payment bank-mandiri
//! dapur cart clear
//! ```

use dapur_core::{PaymentMethod, ProductId};
use dapur_storefront::error::Result;
use dapur_storefront::state::AppState;
use tracing::info;

/// Print cart lines and checkout totals.
pub fn show(state: &AppState, payment: PaymentMethod) {
    let store = state.cart();
    let cart = store.cart();

    if cart.is_empty() {
        info!("Keranjang belanja kosong");
        return;
    }

    for entry in cart {
        let product = entry.product();
        let limit = if entry.can_increment() { "" } else { " (max)" };
        info!(
            "{}  {} x{}{limit}  @ {} = {}",
            product.id,
            product.name,
            entry.quantity(),
            product.price,
            entry.line_total()
        );
    }

    let quote = store.quote(payment);
    info!("Items:    {}", store.total_items());
    info!("Subtotal: {}", quote.items_price);
    if quote.free_shipping() {
        info!("Shipping: Gratis ({})", payment.label());
    } else {
        info!("Shipping: {} ({})", quote.shipping_price, payment.label());
    }
    info!("Total:    {}", quote.total_price);
}

/// Add a product, clamped to its current stock.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched or the cart cannot be
/// saved.
pub async fn add(state: &mut AppState, id: &ProductId, quantity: u32) -> Result<()> {
    let before = state.cart().cart().quantity_of(id);
    if !state.add_to_cart(id, quantity).await? {
        info!("Nothing added: product is out of stock or already at its stock limit");
        return Ok(());
    }

    let after = state.cart().cart().quantity_of(id);
    let added = after.saturating_sub(before);
    if added < quantity {
        info!("Only {added} of {quantity} added (stock limit)");
    }
    info!("{id} x{after} in cart, {} item(s) total", state.cart().total_items());
    Ok(())
}

/// Set the quantity of a product already in the cart.
///
/// A product that is not in the cart, or a quantity of zero, leaves the cart
/// unchanged.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn update(state: &mut AppState, id: &ProductId, quantity: u32) -> Result<()> {
    if !state.cart_mut().update_quantity(id, quantity)? {
        if state.cart().cart().entry(id).is_none() {
            info!("{id} is not in the cart");
        } else if quantity == 0 {
            info!("Quantity must be at least 1; use `cart remove` instead");
        } else {
            info!("{id} x{quantity} already in cart");
        }
        return Ok(());
    }

    let now = state.cart().cart().quantity_of(id);
    if now < quantity {
        info!("Only {now} in stock");
    }
    info!("{id} x{now} in cart");
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn remove(state: &mut AppState, id: &ProductId) -> Result<()> {
    if state.cart_mut().remove_item(id)? {
        info!("{id} removed");
    } else {
        info!("{id} was not in the cart");
    }
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn clear(state: &mut AppState) -> Result<()> {
    state.cart_mut().clear()?;
    info!("Cart cleared");
    Ok(())
}
