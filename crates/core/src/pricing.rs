//! Checkout pricing.
//!
//! Shipping is a flat fee looked up by payment method; it does not depend on
//! distance or weight. Everything here is a pure function of its inputs.

use serde::Serialize;

use crate::cart::Cart;
use crate::types::{PaymentMethod, Price};

/// Flat delivery fee charged for cash-on-delivery orders.
pub const COD_SHIPPING_FEE: Price = Price::new(5_000);

/// Shipping fee for a payment method.
///
/// Cash on delivery pays [`COD_SHIPPING_FEE`]; prepaid methods ship free.
#[must_use]
pub const fn shipping_cost(method: PaymentMethod) -> Price {
    match method {
        PaymentMethod::Cod => COD_SHIPPING_FEE,
        PaymentMethod::BankMandiri | PaymentMethod::QrisMandiri => Price::ZERO,
    }
}

/// Cart total plus shipping.
#[must_use]
pub fn grand_total(cart: &Cart, method: PaymentMethod) -> Price {
    cart.total_price().plus(shipping_cost(method))
}

/// Price breakdown shown on the checkout summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub payment_method: PaymentMethod,
    pub items_price: Price,
    pub shipping_price: Price,
    pub total_price: Price,
}

impl CheckoutQuote {
    /// Price a cart for the given payment method.
    #[must_use]
    pub fn new(cart: &Cart, method: PaymentMethod) -> Self {
        let items_price = cart.total_price();
        let shipping_price = shipping_cost(method);
        Self {
            payment_method: method,
            items_price,
            shipping_price,
            total_price: items_price.plus(shipping_price),
        }
    }

    /// Returns `true` if delivery is free for this quote.
    #[must_use]
    pub const fn free_shipping(&self) -> bool {
        self.shipping_price.is_zero()
    }
}
