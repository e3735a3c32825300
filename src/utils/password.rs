//! Password hashing and the credential-verifier seam.
//!
//! Suspend and delete are destructive, so they re-verify the owner's password
//! even on an already-authenticated request. The trait keeps the lifecycle
//! coordinator testable without real argon2 work in unit tests.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Verifies a plaintext password against a stored hash.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    /// Returns true when `password` matches `stored_hash`.
    ///
    /// A malformed stored hash is treated as a mismatch, never an error.
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Argon2id-backed credential verifier.
#[derive(Default)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Hashes a password for storage. Used by the admin CLI when creating
    /// accounts.
    pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
