//! JWT issuance and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use storepulse_core::{TenantId, UserId};

use crate::models::User;

use super::AuthError;

/// How long an issued token stays valid, in hours.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a Storepulse JWT.
///
/// `tenant_id` is the load-bearing claim: every tenant-scoped read and write
/// derives its scope from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: UserId,
    /// Tenant the user belongs to.
    pub tenant_id: TenantId,
    /// User email, for display.
    pub email: String,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
}

/// Issue a signed token for a user.
///
/// # Errors
///
/// Returns `AuthError::Token` if encoding fails.
pub fn issue_token(user: &User, secret: &SecretString) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        tenant_id: user.tenant_id,
        email: user.email.to_string(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AuthError::Token(e.to_string()))
}

/// Verify a token and return its claims.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for any verification failure — wrong
/// signature, expired, malformed — without distinguishing them to the caller.
pub fn verify_token(token: &str, secret: &SecretString) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use storepulse_core::Email;

    use super::*;

    fn test_user() -> User {
        User {
            id: UserId::generate(),
            tenant_id: TenantId::generate(),
            name: "Jo".to_string(),
            email: Email::parse("jo@example.com").unwrap(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn secret() -> SecretString {
        SecretString::from("kJ8s0qL2nV5xR7tB1wE4yU6iO9pA3dFg")
    }

    #[test]
    fn token_round_trips_claims() {
        let user = test_user();
        let token = issue_token(&user, &secret()).unwrap();

        let claims = verify_token(&token, &secret()).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.tenant_id, user.tenant_id);
        assert_eq!(claims.email, "jo@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = issue_token(&test_user(), &secret()).unwrap();
        let other = SecretString::from("aB3dE5fG7hJ9kL1mN3pQ5rS7tU9vW1xY");

        assert!(matches!(
            verify_token(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(matches!(
            verify_token("not.a.jwt", &secret()),
            Err(AuthError::InvalidToken)
        ));
    }
}
