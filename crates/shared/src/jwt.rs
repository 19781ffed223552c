//! Signed token issuance and validation.
//!
//! Access tokens carry the user, organization, and role claims that every
//! authenticated request is resolved against; refresh tokens are the same
//! claim set with a longer lifetime, exchanged at `/auth/refresh`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;

/// Token signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret the tokens are signed with.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expires_minutes: i64,
    /// Refresh token lifetime in days.
    pub refresh_token_expires_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 7,
        }
    }
}

/// Errors from token issuance or validation.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// The token is malformed or the signature does not verify.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// The token's expiry has passed.
    #[error("token has expired")]
    Expired,
}

/// Issues and validates signed tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys never appear in debug output.
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Derives the signing keys from the configured secret.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues a short-lived access token.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::EncodingError`] if signing fails.
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        role: &str,
    ) -> Result<String, JwtError> {
        let lifetime = Duration::minutes(self.config.access_token_expires_minutes);
        self.issue(user_id, org_id, role, Utc::now() + lifetime)
    }

    /// Issues a long-lived refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::EncodingError`] if signing fails.
    pub fn generate_refresh_token(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        role: &str,
    ) -> Result<String, JwtError> {
        let lifetime = Duration::days(self.config.refresh_token_expires_days);
        self.issue(user_id, org_id, role, Utc::now() + lifetime)
    }

    fn issue(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        role: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, org_id, role, expires_at);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Checks the signature and expiry of a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::Expired`] for a stale token and
    /// [`JwtError::DecodingError`] for anything else that fails to verify.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }

    /// Access token lifetime in seconds, for `expires_in` response fields.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.config.access_token_expires_minutes * 60
    }

    /// Refresh token lifetime in days, for session expiry bookkeeping.
    #[must_use]
    pub const fn refresh_token_expires_days(&self) -> i64 {
        self.config.refresh_token_expires_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(config: JwtConfig) -> JwtService {
        JwtService::new(config)
    }

    fn test_service() -> JwtService {
        service_with(JwtConfig {
            secret: "unit-test-signing-secret".to_string(),
            ..JwtConfig::default()
        })
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let service = test_service();
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();

        let token = service
            .generate_access_token(user_id, org_id, "team_leader")
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.organization_id(), org_id);
        assert_eq!(claims.role, "team_leader");
    }

    #[test]
    fn test_garbage_token_is_a_decoding_error() {
        let err = test_service()
            .validate_token("not.a.token")
            .unwrap_err();
        assert!(matches!(err, JwtError::DecodingError(_)));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let issuer = test_service();
        let verifier = service_with(JwtConfig {
            secret: "a-completely-different-secret".to_string(),
            ..JwtConfig::default()
        });

        let token = issuer
            .generate_access_token(Uuid::new_v4(), Uuid::new_v4(), "user")
            .unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_maps_to_expired() {
        // Negative lifetime puts the expiry beyond the default leeway.
        let service = service_with(JwtConfig {
            secret: "unit-test-signing-secret".to_string(),
            access_token_expires_minutes: -5,
            ..JwtConfig::default()
        });

        let token = service
            .generate_access_token(Uuid::new_v4(), Uuid::new_v4(), "admin")
            .unwrap();
        assert!(matches!(
            service.validate_token(&token).unwrap_err(),
            JwtError::Expired
        ));
    }

    #[test]
    fn test_expires_in_is_seconds() {
        let service = service_with(JwtConfig {
            secret: "unit-test-signing-secret".to_string(),
            access_token_expires_minutes: 15,
            ..JwtConfig::default()
        });
        assert_eq!(service.access_token_expires_in(), 900);
    }
}
