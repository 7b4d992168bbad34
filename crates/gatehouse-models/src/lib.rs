//! # Gatehouse Models
//!
//! Domain models and DTOs for the Gatehouse API.
//!
//! - [`users`]: the stored identity and its public projection
//! - [`auth`]: register/login payloads and response envelopes
//!
//! Request DTOs derive [`validator::Validate`] and all outward types derive
//! [`utoipa::ToSchema`] for the OpenAPI document.

pub mod auth;
pub mod users;

pub use auth::{
    ApiResponse, AuthResponse, ErrorResponse, LoginRequest, MessageResponse, RefreshResponse,
    RegisterRequest,
};
pub use users::{NewUser, PublicUser, User, UserUpdate};
