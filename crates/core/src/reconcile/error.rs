//! Error types for reconciliation operations.

use printdesk_shared::types::money::MoneyError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while reconciling payments against orders.
#[derive(Debug, Error)]
pub enum ReconcileError {
    // ========== Validation Errors ==========
    /// Payment amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Payment amount exceeds the order's remaining balance.
    #[error("Payment amount exceeds order balance; maximum allowed: {max_allowed}")]
    Overpayment {
        /// The amount the caller tried to apply.
        attempted: Decimal,
        /// The largest amount the order can still absorb.
        max_allowed: Decimal,
    },

    // ========== Lookup Errors ==========
    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    // ========== Concurrency Errors ==========
    /// Row-lock conflict on the order during apply/reverse.
    #[error("Concurrent modification of order {0}, please retry")]
    ConcurrentModification(Uuid),

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<MoneyError> for ReconcileError {
    fn from(err: MoneyError) -> Self {
        let MoneyError::NotPositive(amount) = err;
        Self::InvalidAmount(amount)
    }
}

impl ReconcileError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::Overpayment { .. } => 400,
            Self::ClientNotFound(_) | Self::OrderNotFound(_) | Self::PaymentNotFound(_) => 404,
            Self::ConcurrentModification(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the caller may retry the operation as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReconcileError::InvalidAmount(dec!(-5)).error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            ReconcileError::Overpayment {
                attempted: dec!(700),
                max_allowed: dec!(600),
            }
            .error_code(),
            "OVERPAYMENT"
        );
        assert_eq!(
            ReconcileError::PaymentNotFound(Uuid::nil()).error_code(),
            "PAYMENT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(ReconcileError::InvalidAmount(dec!(0)).http_status_code(), 400);
        assert_eq!(
            ReconcileError::Overpayment {
                attempted: dec!(1),
                max_allowed: dec!(0),
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            ReconcileError::ClientNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            ReconcileError::ConcurrentModification(Uuid::nil()).http_status_code(),
            409
        );
        assert_eq!(
            ReconcileError::Database("boom".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ReconcileError::ConcurrentModification(Uuid::nil()).is_retryable());
        assert!(!ReconcileError::InvalidAmount(dec!(0)).is_retryable());
    }

    #[test]
    fn test_overpayment_message_is_actionable() {
        let err = ReconcileError::Overpayment {
            attempted: dec!(700.00),
            max_allowed: dec!(600.00),
        };
        assert_eq!(
            err.to_string(),
            "Payment amount exceeds order balance; maximum allowed: 600.00"
        );
    }
}
