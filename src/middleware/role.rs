//! Role-based authorization.
//!
//! Allowed-role sets are `&'static [UserRole]` fixed at compile time. The
//! layers here must run after [`authenticate`](crate::middleware::auth::authenticate);
//! without an identity they answer 401, not 403.
//!
//! ```rust,ignore
//! let admin_routes = Router::new()
//!     .route("/{id}", get(get_user_by_id))
//!     .route_layer(middleware::from_fn(require_admin))
//!     .route_layer(middleware::from_fn_with_state(state, authenticate));
//! ```

use axum::{extract::Request, middleware::Next, response::Response};
use gatehouse_core::{AppError, UserRole};
use tracing::debug;

use crate::metrics::track_authorization_check;
use crate::middleware::auth::{AuthUser, MISSING_TOKEN_MESSAGE};

pub const FORBIDDEN_MESSAGE: &str = "Insufficient permissions";

pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Checks the caller's role against `allowed_roles` in controller logic.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    let allowed = auth_user.has_any_role(allowed_roles);
    track_authorization_check(allowed, auth_user.role.as_str());

    if !allowed {
        debug!(
            user_id = %auth_user.id,
            role = %auth_user.role,
            "Authorization denied"
        );
        return Err(AppError::forbidden(FORBIDDEN_MESSAGE));
    }

    Ok(())
}

/// Middleware body for a fixed role set.
pub async fn authorize(
    allowed_roles: &'static [UserRole],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(auth_user) = req.extensions().get::<AuthUser>() else {
        return Err(AppError::unauthorized(MISSING_TOKEN_MESSAGE));
    };

    check_any_role(auth_user, allowed_roles)?;

    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    authorize(ADMIN_ONLY, req, next).await
}
