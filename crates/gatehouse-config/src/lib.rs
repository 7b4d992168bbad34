//! # Gatehouse Config
//!
//! Configuration types for the Gatehouse API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`jwt`]: Token signing secret and lifetimes
//! - [`cookie`]: Cookie transport attributes
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`password`]: Password hashing cost
//! - [`server`]: Bind address and deployment environment
//!
//! Every config has a `from_env()` constructor and a `from_vars()` constructor
//! that takes a lookup function, so tests never touch the process environment.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_config::{CookieConfig, CorsConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cookie_config = CookieConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! ```

pub mod cookie;
pub mod cors;
pub mod jwt;
pub mod password;
pub mod server;

// Re-export commonly used types at crate root
pub use cookie::CookieConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use password::PasswordConfig;
pub use server::ServerConfig;

/// Reads `key` through `lookup` and parses it, falling back to `default` when
/// the variable is absent or unparsable.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Like [`parse_or`], but values outside `range` also fall back to `default`.
pub(crate) fn parse_in_range_or<T, F>(
    lookup: &F,
    key: &str,
    range: std::ops::RangeInclusive<T>,
    default: T,
) -> T
where
    T: std::str::FromStr + PartialOrd,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .filter(|value| range.contains(value))
        .unwrap_or(default)
}

/// Interprets `true`/`1` and `false`/`0` (case-insensitive).
pub(crate) fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "true" || v == "1" => true,
        Some(v) if v == "false" || v == "0" => false,
        _ => default,
    }
}
