//! Middleware for request processing.
//!
//! - [`auth`]: token extraction, verification and the [`auth::AuthUser`] extractor
//! - [`role`]: role checks layered after authentication
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` or the `auth_token` cookie
//! 2. `authenticate` verifies the token and attaches an `AuthUser`
//! 3. `require_admin` (or `authorize` with another role set) checks the role
//! 4. Handler executes and reads `AuthUser`

pub mod auth;
pub mod role;
