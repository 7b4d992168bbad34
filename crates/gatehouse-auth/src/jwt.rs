//! Signing and verification of HS256 tokens.
//!
//! [`TokenCodec`] is an immutable value built from a [`JwtConfig`]. It issues
//! access and refresh tokens and verifies them, reporting expected failures as
//! a typed [`VerificationFailure`] rather than an HTTP error. Rotating the
//! secret means building a new codec (see [`crate::shared::SharedTokenCodec`]);
//! tokens signed by the old one stop verifying immediately.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_auth::{TokenCodec, TokenSubject};
//! use gatehouse_config::JwtConfig;
//! use gatehouse_core::UserRole;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env());
//! let subject = TokenSubject {
//!     id: user_id.to_string(),
//!     email: "user@example.com".to_string(),
//!     role: UserRole::User,
//! };
//!
//! let token = codec.issue_access_token(&subject)?;
//! let claims = codec.verify(&token)?;
//! assert_eq!(claims.sub, subject.id);
//! ```

use std::fmt;

use chrono::Utc;
use gatehouse_config::JwtConfig;
use gatehouse_core::{AppError, UserRole};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::claims::{TokenClaims, TokenKind, TokenSubject, Unverified};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is missing required claims")]
    MissingClaims,
}

impl VerificationFailure {
    /// Stable label for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationFailure::Malformed => "malformed",
            VerificationFailure::BadSignature => "bad_signature",
            VerificationFailure::Expired => "expired",
            VerificationFailure::MissingClaims => "missing_claims",
        }
    }
}

/// Signing failed. Only reachable through a broken key or serializer.
#[derive(Debug, Error)]
#[error("Failed to sign {kind} token: {source}")]
pub struct TokenError {
    pub kind: TokenKind,
    #[source]
    pub source: jsonwebtoken::errors::Error,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::internal(err)
    }
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    insecure: bool,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Builds a codec from `config`.
    ///
    /// Logs a warning when the config carries the development fallback secret.
    pub fn new(config: &JwtConfig) -> Self {
        if config.insecure_default {
            warn!(
                "JWT_SECRET is not set; signing with the built-in development secret. \
                 This is insecure and must not be used in production."
            );
        }

        // Expiry is checked by `verify_at` against an explicit clock, so the
        // library's own exp/required-claim checks are switched off.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
            insecure: config.insecure_default,
        }
    }

    /// True when signing with the development fallback secret.
    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// Lifetime in seconds of tokens of `kind`.
    pub fn lifetime(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_token_expiry,
            TokenKind::Refresh => self.refresh_token_expiry,
        }
    }

    pub fn issue_access_token(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue(TokenKind::Access, subject)
    }

    pub fn issue_refresh_token(&self, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, subject)
    }

    pub fn issue(&self, kind: TokenKind, subject: &TokenSubject) -> Result<String, TokenError> {
        self.issue_at(kind, subject, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(
        &self,
        kind: TokenKind,
        subject: &TokenSubject,
        now: i64,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: subject.id.clone(),
            email: subject.email.clone(),
            role: subject.role,
            iat: now,
            exp: now.saturating_add(self.lifetime(kind)),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|source| TokenError { kind, source })
    }

    /// Verifies signature, expiry, and required claims against the current time.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, VerificationFailure> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as if the current time were `now` (Unix seconds).
    ///
    /// The signature is checked before the payload is inspected, so a tampered
    /// payload reports [`VerificationFailure::BadSignature`].
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, VerificationFailure> {
        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;

        let claims = claims_from_map(&data.claims).ok_or(VerificationFailure::MissingClaims)?;

        if now >= claims.exp {
            return Err(VerificationFailure::Expired);
        }

        Ok(claims)
    }

    /// Decodes the payload without checking the signature or expiry.
    ///
    /// Returns `None` when the token cannot be decoded or lacks the required
    /// claims. The result is wrapped in [`Unverified`] so it cannot be passed
    /// where verified claims are expected.
    pub fn parse_unverified(token: &str) -> Option<Unverified<TokenClaims>> {
        let mut validation = Validation::new(ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data =
            decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation)
                .ok()?;

        claims_from_map(&data.claims).map(Unverified::new)
    }
}

fn classify(kind: &ErrorKind) -> VerificationFailure {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            VerificationFailure::BadSignature
        }
        ErrorKind::ExpiredSignature => VerificationFailure::Expired,
        ErrorKind::MissingRequiredClaim(_) => VerificationFailure::MissingClaims,
        _ => VerificationFailure::Malformed,
    }
}

/// Extracts typed claims; `None` if any required field is absent or ill-typed.
fn claims_from_map(map: &Map<String, Value>) -> Option<TokenClaims> {
    let sub = map.get("sub")?.as_str().filter(|s| !s.is_empty())?;
    let email = map.get("email")?.as_str()?;
    let role = map.get("role")?.as_str()?.parse::<UserRole>().ok()?;
    let iat = map.get("iat")?.as_i64()?;
    let exp = map.get("exp")?.as_i64()?;

    Some(TokenClaims {
        sub: sub.to_string(),
        email: email.to_string(),
        role,
        iat,
        exp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig::new("test-secret-key-at-least-32-characters-long")
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            id: "3f0c6a52-8f0e-4a8e-9a59-1f6f4ac9d0b1".to_string(),
            email: "test@example.com".to_string(),
            role: UserRole::User,
        }
    }

    fn sign_raw(payload: Value, secret: &str) -> String {
        encode(
            &Header::new(ALGORITHM),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let token = codec.issue_access_token(&subject()).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, subject().id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_huge_lifetime_saturates_expiry() {
        let mut config = get_test_jwt_config();
        config.access_token_expiry = i64::MAX;
        let codec = TokenCodec::new(&config);

        let token = codec
            .issue_at(TokenKind::Access, &subject(), NOW)
            .unwrap();

        let claims = TokenCodec::parse_unverified(&token).unwrap().into_untrusted();
        assert_eq!(claims.exp, i64::MAX);
        assert!(codec.verify_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let access = codec.issue_at(TokenKind::Access, &subject(), NOW).unwrap();
        let refresh = codec.issue_at(TokenKind::Refresh, &subject(), NOW).unwrap();

        let access_claims = codec.verify_at(&access, NOW).unwrap();
        let refresh_claims = codec.verify_at(&refresh, NOW).unwrap();

        assert_eq!(refresh_claims.exp - refresh_claims.iat, 604_800);
        assert!(refresh_claims.exp > access_claims.exp);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let token = codec.issue_at(TokenKind::Access, &subject(), NOW).unwrap();
        let exp = NOW + 86_400;

        assert!(codec.verify_at(&token, exp - 1).is_ok());
        assert_eq!(
            codec.verify_at(&token, exp),
            Err(VerificationFailure::Expired)
        );
        assert_eq!(
            codec.verify_at(&token, exp + 3600),
            Err(VerificationFailure::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let token = codec.issue_access_token(&subject()).unwrap();

        let other = TokenCodec::new(&JwtConfig::new("different-secret-key-at-least-32-chars"));
        assert_eq!(other.verify(&token), Err(VerificationFailure::BadSignature));
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let token = codec.issue_access_token(&subject()).unwrap();

        let forged_payload = sign_raw(
            json!({"sub": "someone-else", "email": "x@y.z", "role": "admin", "iat": NOW, "exp": NOW + 10}),
            "attacker-secret",
        );
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_payload.split('.').collect();
        parts[1] = forged_parts[1];
        let tampered = parts.join(".");

        assert_eq!(
            codec.verify(&tampered),
            Err(VerificationFailure::BadSignature)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        for token in ["", "invalid-token", "not.enough", "!!!.invalid.chars"] {
            assert_eq!(
                codec.verify(token),
                Err(VerificationFailure::Malformed),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_missing_claims() {
        let config = get_test_jwt_config();
        let codec = TokenCodec::new(&config);
        let far_future = NOW + 10 * 365 * 86_400;

        let missing_role = sign_raw(
            json!({"sub": "u1", "email": "a@b.c", "iat": NOW, "exp": far_future}),
            &config.secret,
        );
        let email_wrong_type = sign_raw(
            json!({"sub": "u1", "email": 42, "role": "user", "iat": NOW, "exp": far_future}),
            &config.secret,
        );
        let empty_subject = sign_raw(
            json!({"sub": "", "email": "a@b.c", "role": "user", "iat": NOW, "exp": far_future}),
            &config.secret,
        );
        let unknown_role = sign_raw(
            json!({"sub": "u1", "email": "a@b.c", "role": "root", "iat": NOW, "exp": far_future}),
            &config.secret,
        );

        for token in [missing_role, email_wrong_type, empty_subject, unknown_role] {
            assert_eq!(
                codec.verify_at(&token, NOW),
                Err(VerificationFailure::MissingClaims)
            );
        }
    }

    #[test]
    fn test_parse_unverified_ignores_signature_and_expiry() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let token = codec.issue_at(TokenKind::Access, &subject(), 1_000).unwrap();

        let unverified = TokenCodec::parse_unverified(&token).unwrap();
        assert_eq!(unverified.peek().sub, subject().id);
        assert_eq!(unverified.into_untrusted().iat, 1_000);

        // The same token is rejected by the verifying path.
        assert_eq!(codec.verify(&token), Err(VerificationFailure::Expired));
    }

    #[test]
    fn test_parse_unverified_rejects_garbage() {
        assert!(TokenCodec::parse_unverified("garbage").is_none());
        assert!(TokenCodec::parse_unverified("").is_none());
    }

    #[test]
    fn test_insecure_flag_follows_config() {
        let secure = TokenCodec::new(&get_test_jwt_config());
        assert!(!secure.is_insecure());

        let insecure = TokenCodec::new(&JwtConfig::from_vars(|_| None));
        assert!(insecure.is_insecure());
    }

    #[test]
    fn test_different_subjects_produce_different_tokens() {
        let codec = TokenCodec::new(&get_test_jwt_config());
        let mut other = subject();
        other.id = "another-id".to_string();

        let token1 = codec.issue_at(TokenKind::Access, &subject(), NOW).unwrap();
        let token2 = codec.issue_at(TokenKind::Access, &other, NOW).unwrap();
        assert_ne!(token1, token2);
    }
}
