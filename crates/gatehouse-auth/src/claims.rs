//! Claim structures carried inside signed tokens.
//!
//! - [`TokenClaims`]: the verified payload of an access or refresh token
//! - [`TokenSubject`]: the identity fields a caller asks to have signed
//! - [`Unverified`]: a payload decoded without checking its signature

use std::fmt;

use gatehouse_core::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two token lifetimes the codec issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims embedded in every token.
///
/// `iat` and `exp` are absolute Unix timestamps, so verification never depends
/// on when or where the token was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenClaims {
    /// Identity id (subject claim)
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Expiry (Unix timestamp); the token is valid while `now < exp`
    pub exp: i64,
}

/// Identity fields to sign into a new token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

/// A token payload decoded without signature verification.
///
/// Only useful for logging and debugging. It deliberately does not deref to
/// the inner value and cannot be turned into an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unverified<T>(T);

impl<T> Unverified<T> {
    pub(crate) fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Borrows the untrusted payload.
    pub fn peek(&self) -> &T {
        &self.0
    }

    /// Consumes the wrapper, returning the untrusted payload.
    pub fn into_untrusted(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize_role_as_string() {
        let claims = TokenClaims {
            sub: "user-id-123".to_string(),
            email: "test@example.com".to_string(),
            role: UserRole::Admin,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"admin""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-id-456","email":"user@test.com","role":"user","exp":9999999999,"iat":9999999900}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-id-456");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert_eq!(TokenKind::Refresh.to_string(), "refresh");
    }
}
