//! Helpers behind the `gatehouse-cli` binary.

use gatehouse_core::{PasswordHasher, UserRole};
use gatehouse_db::{RepositoryError, UserRepository};
use gatehouse_models::{NewUser, RegisterRequest, User};
use rand::RngCore;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

pub const DEFAULT_SECRET_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Password(#[from] gatehouse_core::PasswordError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => CliError::DuplicateEmail,
            other => CliError::Repository(other),
        }
    }
}

/// Creates an `admin` identity. Input goes through the same rules as
/// self-registration.
pub async fn create_admin(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, CliError> {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: name.to_string(),
    }
    .validate()?;

    let password_hash = hasher.hash(password)?;

    let user = users
        .create(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            role: UserRole::Admin,
        })
        .await?;

    Ok(user)
}

/// Hex-encoded random secret of `bytes` bytes, suitable for `JWT_SECRET`.
pub fn generate_secret(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
