use std::env;

use crate::flag_or;

pub const DEFAULT_REFRESH_COOKIE_PATH: &str = "/api/auth/refresh";

#[derive(Clone, Debug)]
pub struct CookieConfig {
    /// Emit the `Secure` attribute. Only disable for plain-HTTP local testing.
    pub secure: bool,
    /// Path the refresh cookie is scoped to; must match the refresh route.
    pub refresh_path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            refresh_path: DEFAULT_REFRESH_COOKIE_PATH.to_string(),
        }
    }
}

impl CookieConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            secure: flag_or(&lookup, "COOKIE_SECURE", true),
            refresh_path: lookup("COOKIE_REFRESH_PATH")
                .filter(|p| p.starts_with('/'))
                .unwrap_or_else(|| DEFAULT_REFRESH_COOKIE_PATH.to_string()),
        }
    }
}
