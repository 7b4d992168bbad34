//! The user persistence seam.

use async_trait::async_trait;
use gatehouse_core::{AppError, UnknownRole};
use gatehouse_models::{NewUser, User, UserUpdate};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Stored user has an invalid role: {0}")]
    InvalidRole(#[from] UnknownRole),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => AppError::conflict(err),
            RepositoryError::NotFound => AppError::not_found(err),
            other => AppError::internal(other),
        }
    }
}

/// Storage for identities.
///
/// Email lookups are exact and case-sensitive. Implementations must back
/// [`find_by_email`](UserRepository::find_by_email) with an index rather than
/// a scan, and must reject a second identity with the same email.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Inserts a new identity with a fresh id.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::DuplicateEmail`] if the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError>;

    /// Applies `update` and returns the stored result.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if no identity has `id`;
    /// [`RepositoryError::DuplicateEmail`] if the new email is taken.
    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User, RepositoryError>;

    /// Returns whether an identity was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
