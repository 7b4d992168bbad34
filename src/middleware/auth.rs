//! Request authentication.
//!
//! [`authenticate`] runs as a route layer: it finds the access token, verifies
//! it with the current codec and stores an [`AuthUser`] in the request
//! extensions. Handlers behind it take `AuthUser` as an extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use gatehouse_auth::{ACCESS_COOKIE_NAME, TokenClaims};
use gatehouse_core::{AppError, UserRole};
use tracing::debug;
use uuid::Uuid;

use crate::metrics::track_jwt_validation;
use crate::state::AppState;

pub const MISSING_TOKEN_MESSAGE: &str = "Authentication required";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// The verified caller, attached to the request by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}

impl TryFrom<TokenClaims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized(INVALID_TOKEN_MESSAGE))?;

        Ok(AuthUser {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(MISSING_TOKEN_MESSAGE))
    }
}

/// Bearer token from `Authorization` if present, otherwise the `auth_token`
/// cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(ACCESS_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| AppError::unauthorized(MISSING_TOKEN_MESSAGE))?;

    let verified = state.tokens.current().verify(&token);
    track_jwt_validation(&verified);

    let claims = verified.map_err(|failure| {
        debug!(reason = failure.as_str(), "Access token rejected");
        AppError::unauthorized(INVALID_TOKEN_MESSAGE)
    })?;

    let auth_user = AuthUser::try_from(claims)?;
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
