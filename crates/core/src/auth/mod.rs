//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles within the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including deleting payments and clients.
    Admin,
    /// Can manage orders and clients; cannot delete payments.
    Manager,
    /// Day-to-day data entry.
    Staff,
}

impl UserRole {
    /// Returns true if this role can delete payments.
    ///
    /// Deleting a payment reverses its effect on the linked order, so it is
    /// restricted to admins.
    #[must_use]
    pub const fn can_delete_payments(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role can delete orders and clients.
    #[must_use]
    pub const fn can_delete_records(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Returns true if this role can manage users.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.can_delete_payments());
        assert!(!UserRole::Manager.can_delete_payments());
        assert!(!UserRole::Staff.can_delete_payments());

        assert!(UserRole::Admin.can_delete_records());
        assert!(UserRole::Manager.can_delete_records());
        assert!(!UserRole::Staff.can_delete_records());

        assert!(UserRole::Admin.can_manage_users());
        assert!(!UserRole::Manager.can_manage_users());
    }

    #[test]
    fn test_role_display_roundtrip() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Staff] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
    }
}
