//! Checkout: turn the cart into an order.
//!
//! Submission is all-or-nothing. If the backend accepts the order the cart
//! is cleared; if anything fails the cart is left exactly as it was so the
//! customer can retry.

use std::future::Future;

use dapur_core::{Order, OrderError, OrderSubmission, PaymentMethod, ShippingAddress};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{BackendClient, BackendError};
use crate::error::add_breadcrumb;
use crate::persistence::CartPersistence;
use crate::store::CartStore;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order could not be built from the cart and form.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The backend rejected the order or could not be reached.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Anything that can accept an order submission.
pub trait OrderGateway {
    /// Create an order and return it as stored by the backend.
    fn create_order(
        &self,
        submission: &OrderSubmission,
    ) -> impl Future<Output = Result<Order, BackendError>> + Send;
}

impl OrderGateway for BackendClient {
    fn create_order(
        &self,
        submission: &OrderSubmission,
    ) -> impl Future<Output = Result<Order, BackendError>> + Send {
        Self::create_order(self, submission)
    }
}

/// What the customer entered on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

/// Submit the cart as an order.
///
/// On success the cart is cleared and the created order returned. A failure
/// to persist the cleared cart is logged but does not fail the checkout,
/// since the order already exists.
///
/// # Errors
///
/// Returns [`CheckoutError::Order`] if the cart is empty or the address is
/// incomplete, and [`CheckoutError::Backend`] if submission fails. The cart
/// is unchanged in both cases.
#[instrument(skip_all, fields(payment_method = %details.payment_method))]
pub async fn place_order<G, P>(
    gateway: &G,
    store: &mut CartStore<P>,
    details: CheckoutDetails,
) -> Result<Order, CheckoutError>
where
    G: OrderGateway,
    P: CartPersistence,
{
    let submission = OrderSubmission::from_cart(
        store.cart(),
        details.shipping_address,
        details.payment_method,
        details.notes,
    )?;

    let order = match gateway.create_order(&submission).await {
        Ok(order) => order,
        Err(e) => {
            warn!(error = %e, "Order submission failed, cart kept");
            return Err(e.into());
        }
    };

    info!(
        order_id = %order.id,
        total_price = submission.total_price.amount(),
        "Order placed"
    );
    let data = [("order_id", order.id.as_str())];
    add_breadcrumb("checkout", "Order placed", Some(data.as_slice()));

    if let Err(e) = store.clear() {
        warn!(error = %e, order_id = %order.id, "Order placed but cleared cart was not saved");
    }

    Ok(order)
}
