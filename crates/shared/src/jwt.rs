//! JWT claims validation for identity-provider tokens.
//!
//! Botica never issues tokens; the external identity provider does. This
//! module only validates signatures and extracts the tenant context.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims for access tokens issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Tenant ID (current context).
    pub tenant: Uuid,
    /// User's role within the tenant.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the tenant ID from claims.
    #[must_use]
    pub const fn tenant_id(&self) -> Uuid {
        self.tenant
    }
}

/// Errors that can occur during JWT validation.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),
}

/// Validates tokens against the shared identity-provider secret.
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtValidator {
    /// Creates a new validator from the shared secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed or the
    /// signature does not verify.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret-key-for-testing";

    fn mint_token(secret: &str, expires_in: Duration) -> (String, Uuid, Uuid) {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            tenant: tenant_id,
            role: "admin".to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (token, user_id, tenant_id)
    }

    #[test]
    fn test_validate_token() {
        let validator = JwtValidator::new(SECRET);
        let (token, user_id, tenant_id) = mint_token(SECRET, Duration::minutes(15));

        let claims = validator.validate_token(&token).unwrap();
        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.tenant_id(), tenant_id);
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_expired_token() {
        let validator = JwtValidator::new(SECRET);
        let (token, _, _) = mint_token(SECRET, Duration::minutes(-5));

        assert!(matches!(
            validator.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let validator = JwtValidator::new(SECRET);
        let (token, _, _) = mint_token("another-secret", Duration::minutes(15));

        assert!(matches!(
            validator.validate_token(&token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let validator = JwtValidator::new(SECRET);
        let result = validator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }
}
