use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use gatehouse_auth::REFRESH_COOKIE_NAME;
use gatehouse_core::AppError;
use gatehouse_models::{
    ApiResponse, AuthResponse, ErrorResponse, LoginRequest, MessageResponse, RefreshResponse,
    RegisterRequest,
};

use crate::middleware::auth::extract_token;
use crate::state::AppState;
use crate::validator::ValidatedJson;

pub const MISSING_REFRESH_TOKEN_MESSAGE: &str = "Refresh token required";

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; access and refresh cookies set", body = AuthResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .sessions
        .register(&dto.email, &dto.password, &dto.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([
            (SET_COOKIE, state.cookies.set_access(&session.access_token)),
            (SET_COOKIE, state.cookies.set_refresh(&session.refresh_token)),
        ]),
        Json(ApiResponse::success(AuthResponse {
            user: session.user.to_public(),
            token: session.access_token,
        })),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; access and refresh cookies set", body = AuthResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.login(&dto.email, &dto.password).await?;

    Ok((
        AppendHeaders([
            (SET_COOKIE, state.cookies.set_access(&session.access_token)),
            (SET_COOKIE, state.cookies.set_refresh(&session.refresh_token)),
        ]),
        Json(ApiResponse::success(AuthResponse {
            user: session.user.to_public(),
            token: session.access_token,
        })),
    ))
}

/// Exchange the refresh cookie for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New access token issued and set as cookie", body = RefreshResponse),
        (status = 401, description = "Refresh token missing, invalid or expired", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("refresh_cookie" = [])),
    tag = "Authentication"
)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized(MISSING_REFRESH_TOKEN_MESSAGE))?;

    let access_token = state.sessions.refresh(&refresh_token).await?;

    Ok((
        AppendHeaders([(SET_COOKIE, state.cookies.set_access(&access_token))]),
        Json(ApiResponse::success(RefreshResponse {
            token: access_token,
        })),
    ))
}

/// Clear the access and refresh cookies
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Cookies cleared", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.sessions.logout(extract_token(&headers).as_deref());

    (
        AppendHeaders([
            (SET_COOKIE, state.cookies.clear_access()),
            (SET_COOKIE, state.cookies.clear_refresh()),
        ]),
        Json(ApiResponse::success(MessageResponse::new(
            "Successfully logged out",
        ))),
    )
}
