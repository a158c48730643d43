//! Order history commands.
//!
//! # Usage
//!
//! ```bash
//! dapur orders list
//! dapur orders show 6660a1b2c3
//! ```

use dapur_core::{Order, OrderId};
use dapur_storefront::error::Result;
use dapur_storefront::state::AppState;
use tracing::info;

/// List the authenticated customer's orders.
///
/// # Errors
///
/// Returns an error if no API token is configured or the backend request
/// fails.
pub async fn list(state: &AppState) -> Result<()> {
    let orders = state.backend().my_orders().await?;

    if orders.is_empty() {
        info!("Belum ada pesanan");
        return Ok(());
    }

    for order in &orders {
        info!(
            "{}  {}  {}  {} item(s)  {}",
            order.id,
            placed_on(order),
            order.status.label(),
            order.total_items(),
            order.total_price
        );
    }
    Ok(())
}

/// Show a single order.
///
/// # Errors
///
/// Returns an error if the order does not exist or the backend request
/// fails.
pub async fn show(state: &AppState, id: &OrderId) -> Result<()> {
    let order = state.backend().get_order(id).await?;

    info!("Order {}", order.id);
    info!("  Placed:   {}", placed_on(&order));
    info!("  Status:   {}", order.status.label());
    info!("  Payment:  {}", order.payment_method.label());

    for line in &order.order_items {
        info!(
            "  {} x{} @ {} = {}",
            line.product_label(),
            line.quantity,
            line.price,
            line.line_total()
        );
    }

    info!("  Subtotal: {}", order.items_price);
    info!("  Shipping: {}", order.shipping_price);
    info!("  Total:    {}", order.total_price);

    let address = &order.shipping_address;
    info!("  Ship to:  {} ({})", address.full_name, address.phone);
    info!(
        "            {}, {} {}",
        address.address, address.city, address.postal_code
    );
    if let Some(notes) = order.notes.as_deref().filter(|n| !n.is_empty()) {
        info!("  Notes:    {notes}");
    }
    if order.awaiting_payment() {
        info!("  Awaiting payment");
    }
    Ok(())
}

fn placed_on(order: &Order) -> String {
    order
        .created_at
        .map_or_else(|| "-".to_string(), |at| at.format("%d %b %Y").to_string())
}
