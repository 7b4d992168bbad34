//! Password hashing and verification.
//!
//! Passwords are hashed with bcrypt, which salts every hash and compares in
//! constant time. bcrypt only reads the first 72 bytes of its input, so longer
//! inputs are rejected up front instead of being silently truncated.

use thiserror::Error;

use crate::errors::AppError;

/// Largest plaintext accepted by [`PasswordHasher::hash`].
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must not exceed {MAX_PASSWORD_BYTES} bytes")]
    InputTooLarge,

    #[error("Failed to hash password: {0}")]
    Hash(#[source] bcrypt::BcryptError),

    #[error("Failed to verify password: {0}")]
    Verify(#[source] bcrypt::BcryptError),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::InputTooLarge => AppError::bad_request(err),
            other => AppError::internal(other),
        }
    }
}

/// bcrypt hasher with a tunable cost factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Creates a hasher; `cost` is clamped into bcrypt's valid range.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes `plaintext` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// [`PasswordError::InputTooLarge`] when the input exceeds
    /// [`MAX_PASSWORD_BYTES`].
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::InputTooLarge);
        }

        bcrypt::hash(plaintext, self.cost).map_err(PasswordError::Hash)
    }

    /// Checks `plaintext` against a stored bcrypt hash.
    ///
    /// Inputs longer than [`MAX_PASSWORD_BYTES`] never match, since no stored
    /// hash could have been produced from them.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        bcrypt::verify(plaintext, hash).map_err(PasswordError::Verify)
    }
}
