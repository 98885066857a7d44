//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserUid;

/// Role string for administrators, as carried in JWT claims.
pub const ROLE_ADMIN: &str = "admin";
/// Role string for regular staff members.
pub const ROLE_STAFF: &str = "staff";

/// JWT claims for access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user uid). Transparent serde keeps the standard string
    /// encoding on the wire.
    pub sub: UserUid,
    /// User's role ("admin" or "staff").
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_uid: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: UserUid::from_uuid(user_uid),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user uid from claims.
    #[must_use]
    pub const fn user_uid(&self) -> Uuid {
        self.sub.into_inner()
    }

    /// Whether the claims carry the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Token pair returned after successful authentication or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// User full name.
    pub full_name: String,
    /// Department the user belongs to (optional).
    pub department_uid: Option<Uuid>,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User uid.
    pub uid: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
    /// User role.
    pub role: String,
    /// Department the user belongs to, when assigned.
    pub department_uid: Option<Uuid>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_roundtrip_fields() {
        let uid = Uuid::new_v4();
        let claims = Claims::new(uid, ROLE_STAFF, Utc::now() + Duration::minutes(15));

        assert_eq!(claims.user_uid(), uid);
        assert_eq!(claims.role, "staff");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_is_admin() {
        let admin = Claims::new(Uuid::new_v4(), ROLE_ADMIN, Utc::now());
        let staff = Claims::new(Uuid::new_v4(), ROLE_STAFF, Utc::now());

        assert!(admin.is_admin());
        assert!(!staff.is_admin());
    }
}
