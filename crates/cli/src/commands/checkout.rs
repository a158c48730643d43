//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! # Preview totals and validate the address without ordering
//! dapur checkout -n "Siti Aminah" -p 081300000000 -a "Jl. Sudirman 5" \
//!     -c Jakarta -z 10220 --payment qris-mandiri --dry-run
//!
//! # Place the order (requires DAPUR_API_TOKEN)
//! dapur checkout -n "Siti Aminah" -p 081300000000 -a "Jl. Sudirman 5" \
//!     -c Jakarta -z 10220 --notes "Tanpa sambal"
//! ```

use clap::Args;
use dapur_core::{OrderError, OrderSubmission, PaymentMethod, ShippingAddress};
use dapur_storefront::checkout::{CheckoutDetails, CheckoutError};
use dapur_storefront::error::Result;
use dapur_storefront::state::AppState;
use tracing::info;

/// Shipping and payment details for `checkout`.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient's full name
    #[arg(short = 'n', long)]
    full_name: String,

    /// Phone number
    #[arg(short, long)]
    phone: String,

    /// Street address
    #[arg(short, long)]
    address: String,

    /// City
    #[arg(short, long)]
    city: String,

    /// Postal code
    #[arg(short = 'z', long)]
    postal_code: String,

    /// Payment method (`cod`, `bank-mandiri`, `qris-mandiri`)
    #[arg(long, default_value_t = PaymentMethod::Cod)]
    payment: PaymentMethod,

    /// Notes for the kitchen or courier
    #[arg(long, default_value = "")]
    notes: String,

    /// Validate and show totals without placing the order
    #[arg(long)]
    dry_run: bool,
}

impl CheckoutArgs {
    fn into_details(self) -> CheckoutDetails {
        CheckoutDetails {
            shipping_address: ShippingAddress {
                full_name: self.full_name,
                address: self.address,
                city: self.city,
                postal_code: self.postal_code,
                phone: self.phone,
            },
            payment_method: self.payment,
            notes: self.notes,
        }
    }
}

/// Place an order for the cart, or preview it with `--dry-run`.
///
/// # Errors
///
/// Returns an error if the cart is empty, the address is incomplete or the
/// backend rejects the order. The cart is kept on any error.
pub async fn run(state: &mut AppState, args: CheckoutArgs) -> Result<()> {
    let dry_run = args.dry_run;
    let details = args.into_details();

    if state.cart().cart().is_empty() {
        info!("Keranjang belanja kosong; add products with `dapur cart add`");
        return Err(CheckoutError::Order(OrderError::EmptyCart).into());
    }

    let quote = state.quote(details.payment_method);
    info!("Payment:  {}", details.payment_method.label());
    info!("          {}", details.payment_method.description());
    info!("Subtotal: {}", quote.items_price);
    info!("Shipping: {}", quote.shipping_price);
    info!("Total:    {}", quote.total_price);

    if dry_run {
        OrderSubmission::from_cart(
            state.cart().cart(),
            details.shipping_address,
            details.payment_method,
            details.notes,
        )
        .map_err(CheckoutError::from)?;
        info!("Dry run: order not placed");
        return Ok(());
    }

    let order = state.checkout(details).await?;

    info!("Order {} placed: {}", order.id, order.status.label());
    if order.awaiting_payment() {
        info!(
            "Please pay {} via {} to start processing",
            order.total_price,
            order.payment_method.label()
        );
    }
    Ok(())
}
