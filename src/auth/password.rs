//! Password hashing and verification
//!
//! Secrets are hashed with Argon2id (PHC string format) using a fresh random salt per call.
//! The plaintext is never stored or logged.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::error::AuthError;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A salted one-way hash in PHC string format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedSecret(String);

impl HashedSecret {
    /// Wrap an already-hashed PHC string (e.g. loaded from storage)
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// The PHC string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the PHC string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for HashedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a password using Argon2id
///
/// # Errors
///
/// Returns [`AuthError::Validation`] when the password is shorter than
/// [`MIN_PASSWORD_LENGTH`] characters, and [`AuthError::Internal`] if hashing itself fails.
///
/// # Example
///
/// ```
/// use session_kernel::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("correct horse").unwrap();
/// assert!(hash.as_str().starts_with("$argon2id$"));
/// assert!(verify_password(hash.as_str(), "correct horse"));
/// ```
pub fn hash_password(plaintext: &str) -> Result<HashedSecret, AuthError> {
    if plaintext.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| HashedSecret(hash.to_string()))
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a candidate password against a stored hash
///
/// Never fails: a malformed hash and a wrong candidate both yield `false`.
pub fn verify_password(hashed: &str, candidate: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hashed) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok()
}
