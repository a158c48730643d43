//! Orders: the submission payload sent at checkout and the order model the
//! backend returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::pricing::CheckoutQuote;
use crate::types::{OrderId, OrderStatus, PaymentMethod, Price, ProductId};

/// Errors that can occur when building an [`OrderSubmission`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,
    /// A required shipping address field is blank.
    #[error("shipping address field `{0}` is required")]
    MissingField(&'static str),
}

/// Delivery address entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingField`] naming the first blank field, in
    /// form order.
    pub fn validate(&self) -> Result<(), OrderError> {
        let fields = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(OrderError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub quantity: u32,
    pub price: Price,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Price,
    pub shipping_price: Price,
    pub total_price: Price,
    pub notes: String,
}

impl OrderSubmission {
    /// Build the submission for the current cart contents.
    ///
    /// Line prices are the unit prices from the cart's product snapshots;
    /// the totals come from [`CheckoutQuote`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] for an empty cart and
    /// [`OrderError::MissingField`] for an incomplete address.
    pub fn from_cart(
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        notes: impl Into<String>,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        shipping_address.validate()?;

        let quote = CheckoutQuote::new(cart, payment_method);
        let order_items = cart
            .entries()
            .iter()
            .map(|entry| OrderItem {
                product: entry.product().id.clone(),
                quantity: entry.quantity(),
                price: entry.product().price,
            })
            .collect();

        Ok(Self {
            order_items,
            shipping_address,
            payment_method,
            items_price: quote.items_price,
            shipping_price: quote.shipping_price,
            total_price: quote.total_price,
            notes: notes.into(),
        })
    }
}

/// Product details embedded in an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// An order line's product, either populated by the backend or a bare ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(OrderedProduct),
    Id(ProductId),
}

impl ProductRef {
    /// The referenced product's ID.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        match self {
            Self::Populated(product) => &product.id,
            Self::Id(id) => id,
        }
    }

    /// Product name, when the backend populated it.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(product) if !product.name.is_empty() => Some(&product.name),
            _ => None,
        }
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// `None` when the product has since been deleted.
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub quantity: u32,
    pub price: Price,
}

impl OrderLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Product name, else its ID, else `-` for a deleted product.
    #[must_use]
    pub fn product_label(&self) -> &str {
        match &self.product {
            Some(product) => product.name().unwrap_or_else(|| product.id().as_str()),
            None => "-",
        }
    }
}

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub items_price: Price,
    #[serde(default)]
    pub shipping_price: Price,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns `true` if the customer still has to pay before the order
    /// ships (pending and not cash on delivery).
    #[must_use]
    pub const fn awaiting_payment(&self) -> bool {
        matches!(self.status, OrderStatus::Pending) && self.payment_method.is_prepaid()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.order_items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }
}
