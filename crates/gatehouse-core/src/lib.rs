//! # Gatehouse Core
//!
//! Core types, errors, and utilities for the Gatehouse API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: Salted bcrypt hashing and constant-time verification
//! - [`roles`]: The closed set of roles an identity can hold
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_core::{AppError, PasswordHasher, UserRole};
//!
//! let hasher = PasswordHasher::new(12);
//! let hash = hasher.hash("correct horse battery staple")?;
//! assert!(hasher.verify("correct horse battery staple", &hash)?);
//!
//! let error = AppError::forbidden("Insufficient permissions");
//! let role: UserRole = "admin".parse()?;
//! ```

pub mod errors;
pub mod password;
pub mod roles;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{PasswordError, PasswordHasher};
pub use roles::{UnknownRole, UserRole};
