//! Order/payment reconciliation engine.
//!
//! Keeps an order's `total_amount`, `paid_amount`, `balance`, and `status`
//! consistent as payments are created, edited, or deleted:
//! - Payment-derived status transitions
//! - Overpayment validation against the remaining balance
//! - Apply/reverse of a payment's effect on the linked order
//! - Error types for reconciliation operations

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{derive_status, Reversal};
pub use error::ReconcileError;
pub use types::{OrderLedger, OrderStatus, PaymentMode, PaymentStatus};
