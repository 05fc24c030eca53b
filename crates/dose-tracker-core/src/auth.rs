//! Password hashing and session tokens.
//!
//! Passwords are stored as argon2 PHC strings. Session tokens are random
//! UUIDs handed to the client once; the database only ever sees their
//! SHA-256 digest.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session is missing or expired")]
    InvalidSession,

    #[error("Email must not be empty")]
    EmptyEmail,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> AuthResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. A malformed stored hash
/// never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Generate a new opaque session token.
pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Digest of a session token as stored in the `sessions` table.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AuthError::EmptyEmail);
    }
    Ok(email)
}
