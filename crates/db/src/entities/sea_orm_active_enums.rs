//! Postgres enum mappings.
//!
//! Database-side enums mirror the domain enums in `printdesk-core`; the `From`
//! conversions keep the two from drifting apart silently.

use printdesk_core::auth::UserRole as CoreUserRole;
use printdesk_core::reconcile::{
    OrderStatus as CoreOrderStatus, PaymentMode as CorePaymentMode,
    PaymentStatus as CorePaymentStatus,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    /// No payment received yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Some payment received, not fully paid.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// Staff moved the order into production.
    #[sea_orm(string_value = "in_production")]
    InProduction,
    /// Staff marked the order delivered.
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Fully paid.
    #[sea_orm(string_value = "paid")]
    Paid,
}

impl From<CoreOrderStatus> for OrderStatus {
    fn from(status: CoreOrderStatus) -> Self {
        match status {
            CoreOrderStatus::Pending => Self::Pending,
            CoreOrderStatus::PartiallyPaid => Self::PartiallyPaid,
            CoreOrderStatus::InProduction => Self::InProduction,
            CoreOrderStatus::Delivered => Self::Delivered,
            CoreOrderStatus::Paid => Self::Paid,
        }
    }
}

impl From<OrderStatus> for CoreOrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::PartiallyPaid => Self::PartiallyPaid,
            OrderStatus::InProduction => Self::InProduction,
            OrderStatus::Delivered => Self::Delivered,
            OrderStatus::Paid => Self::Paid,
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_mode")]
pub enum PaymentMode {
    /// Cash over the counter.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer (NEFT/IMPS/RTGS).
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cheque.
    #[sea_orm(string_value = "cheque")]
    Cheque,
    /// UPI.
    #[sea_orm(string_value = "upi")]
    Upi,
}

impl From<CorePaymentMode> for PaymentMode {
    fn from(mode: CorePaymentMode) -> Self {
        match mode {
            CorePaymentMode::Cash => Self::Cash,
            CorePaymentMode::BankTransfer => Self::BankTransfer,
            CorePaymentMode::Cheque => Self::Cheque,
            CorePaymentMode::Upi => Self::Upi,
        }
    }
}

impl From<PaymentMode> for CorePaymentMode {
    fn from(mode: PaymentMode) -> Self {
        match mode {
            PaymentMode::Cash => Self::Cash,
            PaymentMode::BankTransfer => Self::BankTransfer,
            PaymentMode::Cheque => Self::Cheque,
            PaymentMode::Upi => Self::Upi,
        }
    }
}

/// Settlement state of a payment record.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    /// Recorded but not yet cleared (e.g. cheque in hand).
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Partially cleared.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Cleared in full.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<CorePaymentStatus> for PaymentStatus {
    fn from(status: CorePaymentStatus) -> Self {
        match status {
            CorePaymentStatus::Pending => Self::Pending,
            CorePaymentStatus::Partial => Self::Partial,
            CorePaymentStatus::Completed => Self::Completed,
        }
    }
}

impl From<PaymentStatus> for CorePaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Partial => Self::Partial,
            PaymentStatus::Completed => Self::Completed,
        }
    }
}

/// User role.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Full access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Manages orders and clients.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Data entry.
    #[sea_orm(string_value = "staff")]
    Staff,
}

impl From<CoreUserRole> for UserRole {
    fn from(role: CoreUserRole) -> Self {
        match role {
            CoreUserRole::Admin => Self::Admin,
            CoreUserRole::Manager => Self::Manager,
            CoreUserRole::Staff => Self::Staff,
        }
    }
}

impl From<UserRole> for CoreUserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Manager => Self::Manager,
            UserRole::Staff => Self::Staff,
        }
    }
}

/// Kind of client on the books.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "client_type")]
pub enum ClientType {
    /// School account.
    #[sea_orm(string_value = "school")]
    School,
    /// Dealer account.
    #[sea_orm(string_value = "dealer")]
    Dealer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_order_status_roundtrip() {
        for status in OrderStatus::iter() {
            let core: CoreOrderStatus = status.clone().into();
            assert_eq!(OrderStatus::from(core), status);
        }
    }

    #[test]
    fn test_payment_mode_roundtrip() {
        for mode in PaymentMode::iter() {
            let core: CorePaymentMode = mode.clone().into();
            assert_eq!(PaymentMode::from(core), mode);
        }
    }

    #[test]
    fn test_user_role_roundtrip() {
        for role in UserRole::iter() {
            let core: CoreUserRole = role.clone().into();
            assert_eq!(UserRole::from(core), role);
        }
    }
}
