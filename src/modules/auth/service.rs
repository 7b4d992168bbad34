//! Registration, login, refresh and logout.
//!
//! Password work runs on the blocking pool so a slow bcrypt cost never stalls
//! the async workers. Signing and verification are cheap and stay inline.

use std::sync::Arc;

use gatehouse_auth::{SharedTokenCodec, TokenCodec, TokenError, TokenKind};
use gatehouse_core::{AppError, PasswordError, PasswordHasher, UserRole};
use gatehouse_db::{RepositoryError, UserRepository};
use gatehouse_models::{NewUser, User};
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::task::JoinError;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::metrics::{
    track_jwt_issued, track_jwt_validation, track_user_login_failure, track_user_login_success,
    track_user_registered,
};

/// Hashed once per service and verified against when the email is unknown,
/// so both login failures cost the same bcrypt work.
const TIMING_PLACEHOLDER_PASSWORD: &str = "gatehouse-timing-placeholder";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidToken,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password task failed: {0}")]
    Task(#[from] JoinError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => AuthError::DuplicateEmail,
            other => AuthError::Repository(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => AppError::conflict(err),
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                AppError::unauthorized(err.to_string())
            }
            AuthError::Password(e) => e.into(),
            AuthError::Repository(e) => e.into(),
            AuthError::Token(e) => e.into(),
            AuthError::Task(e) => AppError::internal(e),
        }
    }
}

/// An identity together with a freshly issued token pair.
#[derive(Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    tokens: SharedTokenCodec,
    passwords: PasswordHasher,
    placeholder_hash: Arc<OnceCell<String>>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: SharedTokenCodec,
        passwords: PasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            placeholder_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Creates a `user`-role identity and signs it in.
    ///
    /// Emails are compared exactly; `A@x.com` and `a@x.com` are different
    /// identities.
    #[instrument(skip(self, password, name))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, AuthError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;

        // A concurrent registration can still win the race; the unique index
        // turns that into DuplicateEmail as well.
        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash,
                role: UserRole::User,
            })
            .await?;

        let session = self.issue_session(user)?;
        track_user_registered();
        info!(user_id = %session.user.id, "User registered");

        Ok(session)
    }

    /// Checks credentials and signs the identity in.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.verify_against_placeholder(password).await?;
            track_user_login_failure("unknown_email");
            debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(password, &user.password_hash)
            .await?
        {
            track_user_login_failure("wrong_password");
            debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue_session(user)?;
        track_user_login_success(session.user.role.as_str());
        info!(user_id = %session.user.id, "User logged in");

        Ok(session)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated. Claims in the new access token
    /// come from the stored identity, so a role change takes effect here.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let codec = self.tokens.current();

        let verified = codec.verify(refresh_token);
        track_jwt_validation(&verified);
        let claims = verified.map_err(|failure| {
            debug!(reason = failure.as_str(), "Refresh token rejected");
            AuthError::InvalidToken
        })?;

        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let Some(user) = self.users.find_by_id(id).await? else {
            warn!(user_id = %id, "Refresh token for a missing user");
            return Err(AuthError::InvalidToken);
        };

        let access_token = codec.issue_access_token(&user.token_subject())?;
        track_jwt_issued(TokenKind::Access);
        debug!(user_id = %user.id, "Access token refreshed");

        Ok(access_token)
    }

    /// Logout is stateless: nothing is revoked server-side. The presented
    /// token, if any, is only decoded to attribute the log line.
    pub fn logout(&self, access_token: Option<&str>) {
        match access_token.and_then(TokenCodec::parse_unverified) {
            Some(claims) => info!(subject = %claims.peek().sub, "User logged out"),
            None => info!("Anonymous logout"),
        }
    }

    fn issue_session(&self, user: User) -> Result<Session, AuthError> {
        let codec = self.tokens.current();
        let subject = user.token_subject();

        let access_token = codec.issue_access_token(&subject)?;
        track_jwt_issued(TokenKind::Access);
        let refresh_token = codec.issue_refresh_token(&subject)?;
        track_jwt_issued(TokenKind::Refresh);

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.passwords;
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hash)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.passwords;
        let password = password.to_string();
        let hash = hash.to_string();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await??;
        Ok(matches)
    }

    async fn verify_against_placeholder(&self, password: &str) -> Result<(), AuthError> {
        let placeholder = self
            .placeholder_hash
            .get_or_try_init(|| self.hash_password(TIMING_PLACEHOLDER_PASSWORD))
            .await?;
        self.verify_password(password, placeholder).await?;
        Ok(())
    }
}
