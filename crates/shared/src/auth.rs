//! Authentication claims shared between the API layer and the JWT service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role names recognised by the system.
pub const ROLE_ADMIN: &str = "admin";
/// Manager role: can manage orders and clients, but not delete payments.
pub const ROLE_MANAGER: &str = "manager";
/// Staff role: day-to-day data entry.
pub const ROLE_STAFF: &str = "staff";

/// JWT claims for an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// User role (`admin`, `manager`, or `staff`).
    pub role: String,
    /// Expiration time (UNIX timestamp).
    pub exp: i64,
    /// Issued-at time (UNIX timestamp).
    pub iat: i64,
}

impl Claims {
    /// Creates claims for a user expiring at the given time.
    #[must_use]
    pub fn new(user_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            role: role.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        }
    }

    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns true if the user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_roundtrip_fields() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, ROLE_ADMIN, Utc::now() + Duration::hours(1));
        assert_eq!(claims.user_id(), user_id);
        assert!(claims.is_admin());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_non_admin_roles() {
        let claims = Claims::new(Uuid::new_v4(), ROLE_STAFF, Utc::now());
        assert!(!claims.is_admin());
        let claims = Claims::new(Uuid::new_v4(), ROLE_MANAGER, Utc::now());
        assert!(!claims.is_admin());
    }
}
