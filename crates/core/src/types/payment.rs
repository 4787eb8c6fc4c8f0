//! How an order is paid.

use serde::{Deserialize, Serialize};

/// The payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentKind {
    /// Credit/debit card, settled through the payment processor.
    #[default]
    #[serde(rename = "card")]
    Card,
    /// Cash on delivery.
    #[serde(rename = "cod")]
    CashOnDelivery,
    /// Manual bank transfer.
    #[serde(rename = "bank")]
    BankTransfer,
}

impl PaymentKind {
    /// The wire value stored on the order row.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::CashOnDelivery => "cod",
            Self::BankTransfer => "bank",
        }
    }
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(
            serde_json::to_string(&PaymentKind::CashOnDelivery).unwrap(),
            "\"cod\""
        );
        let kind: PaymentKind = serde_json::from_str("\"bank\"").unwrap();
        assert_eq!(kind, PaymentKind::BankTransfer);
    }

    #[test]
    fn test_display_matches_wire() {
        assert_eq!(PaymentKind::Card.to_string(), "card");
    }
}
