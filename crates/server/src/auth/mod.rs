//! Authentication: password hashing and JWT issuance/verification.
//!
//! Auth is stateless: a successful login issues an HS256 JWT carrying the
//! user's ID, email, and — critically — the tenant ID. Every tenant-scoped
//! operation derives its scope from these verified claims, never from a
//! client-supplied parameter.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, issue_token, verify_token};
pub use password::{hash_password, verify_password};

use thiserror::Error;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not match a user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration attempted with an email that is already taken.
    #[error("a user with this email already exists")]
    UserAlreadyExists,

    /// The presented token failed verification or has expired.
    #[error("token invalid or expired")]
    InvalidToken,

    /// Password hashing or verification failed internally.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Token encoding failed internally.
    #[error("token issuance failed: {0}")]
    Token(String),
}
