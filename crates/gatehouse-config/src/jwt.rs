use std::env;
use std::fmt;

use crate::parse_in_range_or;

/// Development fallback used when `JWT_SECRET` is not configured.
///
/// Tokens signed with this value can be forged by anyone who has read this
/// file. It must never be used in production.
pub const DEV_FALLBACK_SECRET: &str = "super-secret-jwt-key-change-in-production";

/// 24 hours.
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 86_400;
/// 7 days.
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604_800;
/// Longest lifetime accepted from the environment: 365 days.
pub const MAX_TOKEN_EXPIRY: i64 = 31_536_000;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry: i64,
    /// Set when `secret` is [`DEV_FALLBACK_SECRET`] because nothing was configured.
    pub insecure_default: bool,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("insecure_default", &self.insecure_default)
            .finish()
    }
}

impl JwtConfig {
    /// Config with an explicit secret and the default lifetimes.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
            insecure_default: false,
        }
    }

    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let configured = lookup("JWT_SECRET").filter(|s| !s.trim().is_empty());
        let insecure_default = configured.is_none();

        Self {
            secret: configured.unwrap_or_else(|| DEV_FALLBACK_SECRET.to_string()),
            access_token_expiry: parse_in_range_or(
                &lookup,
                "JWT_ACCESS_EXPIRY",
                1..=MAX_TOKEN_EXPIRY,
                DEFAULT_ACCESS_TOKEN_EXPIRY,
            ),
            refresh_token_expiry: parse_in_range_or(
                &lookup,
                "JWT_REFRESH_EXPIRY",
                1..=MAX_TOKEN_EXPIRY,
                DEFAULT_REFRESH_TOKEN_EXPIRY,
            ),
            insecure_default,
        }
    }
}
