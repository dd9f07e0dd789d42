//! Password hashing and verification.
//!
//! Uses Argon2id with per-password random salts. Stored hashes are in PHC
//! string format, so parameters can change without invalidating old hashes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::{CatnewsError, Result};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check that a plaintext password is acceptable before hashing it.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CatnewsError::InvalidCredentials);
    }
    Ok(())
}

/// Hash a plaintext password with Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CatnewsError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash.
///
/// Returns `Ok(false)` on mismatch. An empty stored hash never matches;
/// OAuth-only accounts have no password.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    if stored_hash.is_empty() {
        return Ok(false);
    }

    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| CatnewsError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
