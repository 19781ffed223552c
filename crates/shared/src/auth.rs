//! Claim and request/response types for the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The claim set carried by both access and refresh tokens.
///
/// A token is always bound to one organization; switching organizations
/// means logging in to the other one, never reusing a token across
/// tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    /// Organization the token is scoped to.
    pub org: Uuid,
    /// The user's role within that organization.
    pub role: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// Builds a claim set expiring at `expires_at`.
    #[must_use]
    pub fn new(user_id: Uuid, org_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            org: org_id,
            role: role.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// The user the token was issued to.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// The organization the token is scoped to.
    #[must_use]
    pub const fn organization_id(&self) -> Uuid {
        self.org
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Account email; must not already be registered.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Display name.
    pub full_name: String,
}

/// `POST /auth/refresh` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

/// `POST /auth/logout` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to revoke.
    pub refresh_token: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// The authenticated account.
    pub user: UserInfo,
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Account details returned by auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// Account id.
    pub id: Uuid,
    /// Account email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Organizations the account belongs to, with the role held in each.
    pub organizations: Vec<UserOrganization>,
}

/// One organization membership on a [`UserInfo`].
#[derive(Debug, Clone, Serialize)]
pub struct UserOrganization {
    /// Organization id.
    pub id: Uuid,
    /// Organization name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// The account's role in this organization.
    pub role: String,
}

/// `POST /organizations` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Organization name.
    pub name: String,
    /// URL-friendly slug; unique across the system.
    pub slug: String,
}

/// `POST /organizations/{org_id}/members` body.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    /// Email of the account to add; must already be registered.
    pub email: String,
    /// Role to grant: `admin`, `team_leader`, or `user`.
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_carry_scope_and_expiry() {
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::minutes(15);

        let claims = Claims::new(user_id, org_id, "admin", expires_at);

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.organization_id(), org_id);
        assert_eq!(claims.exp, expires_at.timestamp());
        assert!(claims.iat <= claims.exp);
    }
}
