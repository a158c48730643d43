//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// How the customer pays for an order.
///
/// Serialized with the backend's wire names (`COD`, `BANK_MANDIRI`,
/// `QRIS_MANDIRI`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// Bank transfer to a Bank Mandiri account.
    BankMandiri,
    /// QRIS code issued by Bank Mandiri.
    QrisMandiri,
}

impl PaymentMethod {
    /// All payment methods, in the order they are offered at checkout.
    pub const ALL: [Self; 3] = [Self::Cod, Self::BankMandiri, Self::QrisMandiri];

    /// Customer-facing name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cod => "Bayar di Tempat (COD)",
            Self::BankMandiri => "Transfer Bank Mandiri",
            Self::QrisMandiri => "QRIS Bank Mandiri",
        }
    }

    /// Short description shown under the label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cod => "Bayar saat barang diterima",
            Self::BankMandiri => "Transfer ke rekening Bank Mandiri",
            Self::QrisMandiri => "Scan kode QRIS dari aplikasi pembayaran",
        }
    }

    /// Returns `true` if payment happens before delivery.
    #[must_use]
    pub const fn is_prepaid(self) -> bool {
        !matches!(self, Self::Cod)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "cod"),
            Self::BankMandiri => write!(f, "bank-mandiri"),
            Self::QrisMandiri => write!(f, "qris-mandiri"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    /// Accepts both the CLI spelling (`bank-mandiri`) and the wire spelling
    /// (`BANK_MANDIRI`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "cod" => Ok(Self::Cod),
            "bank-mandiri" => Ok(Self::BankMandiri),
            "qris-mandiri" => Ok(Self::QrisMandiri),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Order progress as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Customer-facing name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Menunggu",
            Self::Processing => "Diproses",
            Self::Shipping => "Dikirim",
            Self::Delivered => "Diterima",
            Self::Cancelled => "Dibatalkan",
        }
    }

    /// Returns `true` once the order can no longer change.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankMandiri).unwrap(),
            "\"BANK_MANDIRI\""
        );
        let parsed: PaymentMethod = serde_json::from_str("\"QRIS_MANDIRI\"").unwrap();
        assert_eq!(parsed, PaymentMethod::QrisMandiri);
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("cod".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
        assert_eq!(
            "BANK_MANDIRI".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankMandiri
        );
        assert_eq!(
            "qris-mandiri".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::QrisMandiri
        );
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.to_string().parse::<PaymentMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_order_status() {
        let status: OrderStatus = serde_json::from_str("\"shipping\"").unwrap();
        assert_eq!(status, OrderStatus::Shipping);
        assert_eq!(status.label(), "Dikirim");
        assert!(!status.is_final());
        assert!(OrderStatus::Cancelled.is_final());
    }
}
