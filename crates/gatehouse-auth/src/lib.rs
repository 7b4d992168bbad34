//! # Gatehouse Auth
//!
//! Token and cookie primitives for the Gatehouse API.
//!
//! This crate provides:
//!
//! - [`claims`]: claim structures and the [`Unverified`] wrapper
//! - [`jwt`]: [`TokenCodec`], which issues and verifies HS256 tokens
//! - [`shared`]: [`SharedTokenCodec`], the swappable process-wide codec handle
//! - [`cookie`]: [`CookieTransport`], which formats `Set-Cookie` values
//!
//! # Token Types
//!
//! - **Access token**: default 24h, sent as `Authorization: Bearer` or the
//!   `auth_token` cookie
//! - **Refresh token**: default 7 days, sent only as the `refresh_token`
//!   cookie scoped to the refresh route
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_auth::{CookieTransport, SharedTokenCodec};
//! use gatehouse_config::{CookieConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let tokens = SharedTokenCodec::from_config(&jwt_config);
//! let cookies = CookieTransport::new(&CookieConfig::from_env(), &jwt_config);
//!
//! let token = tokens.current().issue_access_token(&subject)?;
//! let set_cookie = cookies.set_access(&token);
//! ```

pub mod claims;
pub mod cookie;
pub mod jwt;
pub mod shared;

// Re-export commonly used types at crate root
pub use claims::{TokenClaims, TokenKind, TokenSubject, Unverified};
pub use crate::cookie::{ACCESS_COOKIE_NAME, CookieTransport, REFRESH_COOKIE_NAME};
pub use jwt::{TokenCodec, TokenError, VerificationFailure};
pub use shared::SharedTokenCodec;
