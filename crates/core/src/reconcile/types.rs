//! Domain types for the reconciliation engine.
//!
//! These are the stable internal enums; the wire vocabulary (Title Case
//! strings like "Partially Paid") is translated at the I/O boundary only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status.
///
/// `Pending`, `PartiallyPaid`, and `Paid` are payment-derived and never set by
/// hand once payments exist. `InProduction` and `Delivered` are pipeline
/// stages set manually by staff, orthogonal to payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// No payment received yet.
    Pending,
    /// Some payment received, balance outstanding.
    PartiallyPaid,
    /// Pipeline stage: job is on the press.
    InProduction,
    /// Pipeline stage: job handed over to the client.
    Delivered,
    /// Fully settled.
    Paid,
}

impl OrderStatus {
    /// Returns true for the manually-set pipeline stages.
    #[must_use]
    pub const fn is_pipeline_stage(self) -> bool {
        matches!(self, Self::InProduction | Self::Delivered)
    }

    /// The client-facing label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PartiallyPaid => "Partially Paid",
            Self::InProduction => "In Production",
            Self::Delivered => "Delivered",
            Self::Paid => "Paid",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Partially Paid" => Ok(Self::PartiallyPaid),
            "In Production" => Ok(Self::InProduction),
            "Delivered" => Ok(Self::Delivered),
            "Paid" => Ok(Self::Paid),
            _ => Err(format!("Unknown order status: {s}")),
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Cash over the counter.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Cheque.
    Cheque,
    /// UPI transfer.
    Upi,
}

impl PaymentMode {
    /// The client-facing label for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::BankTransfer => "Bank Transfer",
            Self::Cheque => "Cheque",
            Self::Upi => "UPI",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The frontend has shipped several spellings over time; normalize.
        match s.to_uppercase().replace(' ', "_").as_str() {
            "CASH" => Ok(Self::Cash),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "CHEQUE" => Ok(Self::Cheque),
            "UPI" => Ok(Self::Upi),
            _ => Err(format!("Unknown payment mode: {s}")),
        }
    }
}

/// Settlement state of a single payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Recorded but not yet cleared (e.g., cheque in hand).
    Pending,
    /// Partially cleared.
    Partial,
    /// Fully cleared.
    Completed,
}

impl PaymentStatus {
    /// The client-facing label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Partial => "Partial",
            Self::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PARTIAL" => Ok(Self::Partial),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(format!("Unknown payment status: {s}")),
        }
    }
}

/// Snapshot of an order's monetary state, the unit the engine operates on.
///
/// Invariant after every committed write: `balance == round(total_amount -
/// paid_amount, 2)` and `0 <= paid_amount <= total_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLedger {
    /// The order's full value. Immutable once items are finalized.
    pub total_amount: Decimal,
    /// Sum of payments applied so far.
    pub paid_amount: Decimal,
    /// Derived: `total_amount - paid_amount`, never edited directly.
    pub balance: Decimal,
    /// Current status (payment-derived or pipeline stage).
    pub status: OrderStatus,
}

impl OrderLedger {
    /// Creates the ledger state for a freshly created order.
    #[must_use]
    pub fn new(total_amount: Decimal) -> Self {
        Self {
            total_amount,
            paid_amount: Decimal::ZERO,
            balance: total_amount,
            status: OrderStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_order_status_labels_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::PartiallyPaid,
            OrderStatus::InProduction,
            OrderStatus::Delivered,
            OrderStatus::Paid,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::from_str("Shipped").is_err());
    }

    #[test]
    fn test_pipeline_stages() {
        assert!(OrderStatus::InProduction.is_pipeline_stage());
        assert!(OrderStatus::Delivered.is_pipeline_stage());
        assert!(!OrderStatus::Pending.is_pipeline_stage());
        assert!(!OrderStatus::PartiallyPaid.is_pipeline_stage());
        assert!(!OrderStatus::Paid.is_pipeline_stage());
    }

    #[test]
    fn test_payment_mode_accepts_legacy_spellings() {
        assert_eq!(PaymentMode::from_str("Bank Transfer").unwrap(), PaymentMode::BankTransfer);
        assert_eq!(PaymentMode::from_str("BANK_TRANSFER").unwrap(), PaymentMode::BankTransfer);
        assert_eq!(PaymentMode::from_str("upi").unwrap(), PaymentMode::Upi);
        assert_eq!(PaymentMode::from_str("cash").unwrap(), PaymentMode::Cash);
        assert!(PaymentMode::from_str("Barter").is_err());
    }

    #[test]
    fn test_new_order_ledger() {
        let ledger = OrderLedger::new(dec!(5000));
        assert_eq!(ledger.paid_amount, dec!(0));
        assert_eq!(ledger.balance, dec!(5000));
        assert_eq!(ledger.status, OrderStatus::Pending);
    }
}
