use axum::Json;
use axum::extract::{Path, State};
use gatehouse_core::AppError;
use gatehouse_db::UserRepository;
use gatehouse_models::{ApiResponse, ErrorResponse, PublicUser};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = PublicUser),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = []), ("access_cookie" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    let user = state
        .users
        .find_by_id(auth_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// Get a user by id (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User id (UUID)")
    ),
    responses(
        (status = 200, description = "User found", body = PublicUser),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []), ("access_cookie" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user), fields(admin_id = %auth_user.id))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PublicUser>>, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::bad_request(anyhow::anyhow!("Invalid user ID")))?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

    Ok(Json(ApiResponse::success(user.into())))
}
