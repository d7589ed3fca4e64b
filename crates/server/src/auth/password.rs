//! Password hashing and verification.
//!
//! Uses Argon2id. The hash is stored in PHC string format, which embeds the
//! salt and parameters, so verification needs nothing but the stored hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::AuthError;

/// Hash a password using Argon2id.
///
/// Returns the hash in PHC format: `$argon2id$v=19$m=...,t=...,p=...$salt$hash`
///
/// # Errors
///
/// Returns `AuthError::Hash` if hashing fails internally.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::Hash` if the stored hash cannot be parsed or
/// verification fails for a reason other than a wrong password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::Hash(format!("invalid hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}
