//! Formatting of the access and refresh cookies.
//!
//! This is a pure formatting boundary: tokens arrive already signed and leave
//! as `Set-Cookie` header values. Every cookie is `HttpOnly`, `SameSite=Strict`
//! and (unless disabled for local HTTP) `Secure`.

use ::cookie::time::{Duration, OffsetDateTime};
use ::cookie::{Cookie, SameSite};
use gatehouse_config::{CookieConfig, JwtConfig};

pub const ACCESS_COOKIE_NAME: &str = "auth_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(Debug, Clone)]
pub struct CookieTransport {
    secure: bool,
    refresh_path: String,
    access_max_age: i64,
    refresh_max_age: i64,
}

impl CookieTransport {
    /// Cookie lifetimes follow the token lifetimes in `jwt_config`.
    pub fn new(cookie_config: &CookieConfig, jwt_config: &JwtConfig) -> Self {
        Self {
            secure: cookie_config.secure,
            refresh_path: cookie_config.refresh_path.clone(),
            access_max_age: jwt_config.access_token_expiry,
            refresh_max_age: jwt_config.refresh_token_expiry,
        }
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    pub fn set_access(&self, token: &str) -> String {
        self.build(ACCESS_COOKIE_NAME, token, "/", self.access_max_age)
            .to_string()
    }

    pub fn set_refresh(&self, token: &str) -> String {
        self.build(
            REFRESH_COOKIE_NAME,
            token,
            &self.refresh_path,
            self.refresh_max_age,
        )
        .to_string()
    }

    pub fn clear_access(&self) -> String {
        self.expired(ACCESS_COOKIE_NAME, "/")
    }

    pub fn clear_refresh(&self) -> String {
        self.expired(REFRESH_COOKIE_NAME, &self.refresh_path)
    }

    fn expired(&self, name: &'static str, path: &str) -> String {
        let mut cookie = self.build(name, "", path, 0);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie.to_string()
    }

    fn build(&self, name: &'static str, value: &str, path: &str, max_age: i64) -> Cookie<'static> {
        Cookie::build((name, value.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path(path.to_string())
            .max_age(Duration::seconds(max_age))
            .build()
    }
}
