//! Token verification for the hosted identity provider.
//!
//! Bursar never issues or refreshes tokens. The identity provider signs a
//! JWT carrying the user, organization, and role; this module only verifies
//! that signature and exposes the claims.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by a provider-issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Organization ID (current tenant context).
    pub org: Uuid,
    /// User's role in the organization.
    pub role: String,
    /// Requester email, used for status notifications.
    pub email: String,
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

    /// Returns the organization ID from claims.
    #[must_use]
    pub const fn organization_id(&self) -> Uuid {
        self.org
    }
}

/// Errors that can occur while verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is malformed or the signature does not verify.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Verifies provider-signed tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a verifier from the shared secret configured for the provider.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verifies and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the token has expired and
    /// `TokenError::Invalid` if it is malformed or forged.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret-key-for-testing";

    fn provider_token(secret: &str, expires_in: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            org: Uuid::new_v4(),
            role: "treasurer".to_string(),
            email: "member@example.org".to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = TokenVerifier::new(SECRET);
        let token = provider_token(SECRET, Duration::minutes(15));

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.role, "treasurer");
        assert_eq!(claims.email, "member@example.org");
    }

    #[test]
    fn test_verify_expired_token() {
        let verifier = TokenVerifier::new(SECRET);
        let token = provider_token(SECRET, Duration::minutes(-5));

        assert!(matches!(verifier.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let verifier = TokenVerifier::new(SECRET);
        let token = provider_token("some-other-secret", Duration::minutes(15));

        assert!(matches!(
            verifier.verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_verify_garbage() {
        let verifier = TokenVerifier::new(SECRET);
        assert!(verifier.verify("not.a.token").is_err());
    }
}
