use gatehouse_auth::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, TokenClaims};
use gatehouse_core::UserRole;
use gatehouse_models::{
    AuthResponse, ErrorResponse, LoginRequest, MessageResponse, PublicUser, RefreshResponse,
    RegisterRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::logout,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::get_user_by_id,
    ),
    components(
        schemas(
            PublicUser,
            UserRole,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            RefreshResponse,
            MessageResponse,
            ErrorResponse,
            TokenClaims,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Users", description = "User profile endpoints")
    ),
    info(
        title = "Gatehouse API",
        version = "0.1.0",
        description = "Authentication and session service with HS256 tokens and cookie transport.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "access_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_COOKIE_NAME))),
            );
            components.add_security_scheme(
                "refresh_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(REFRESH_COOKIE_NAME))),
            );
        }
    }
}
