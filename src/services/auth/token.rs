use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;

/// Upper bound for both the token lifetime and the verification leeway.
pub const MAX_TOKEN_WINDOW_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Access token (JWT) claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

// Errors returned by access-token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Could not be parsed, or the signature does not match the secret.
    Malformed,
    /// Signature is fine but a semantic check (expiry, subject) failed.
    Invalid,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed token"),
            Self::Invalid => write!(f, "token is not valid"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::Invalid,
            _ => Self::Malformed,
        }
    }
}

/// HS256 token codec: signs identity tokens at login and verifies them on every
/// protected request.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue an access token for `user_id`, valid from now.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue an access token as if the current time were `issued_at`.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let iat = issued_at.timestamp();
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.ttl_seconds, "token lifetime out of range");
                AppError::Internal
            })?;
        let claims = AccessTokenClaims {
            user_id,
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }

    /// Verify signature and expiry, then return the embedded user id.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;

        // Signed by us but not pointing at a real account id
        if data.claims.user_id <= 0 {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test_secret_key_for_testing_purposes", 3600, 0)
    }

    #[test]
    fn issue_then_verify_returns_user_id() {
        let codec = codec();
        let token = codec.issue(42).unwrap();

        assert!(!token.is_empty());
        assert_eq!(codec.verify(&token), Ok(42));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(codec().verify("invalid.token.here"), Err(TokenError::Malformed));
        assert_eq!(codec().verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let other = TokenCodec::new(b"another_secret", 3600, 0);
        let token = other.issue(1).unwrap();

        assert_eq!(codec().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn expired_token_is_invalid() {
        let codec = codec();
        let token = codec
            .issue_at(1, Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn leeway_accepts_recently_expired_token() {
        let codec = TokenCodec::new(b"secret", 10, 120);
        let token = codec
            .issue_at(5, Utc::now() - Duration::seconds(60))
            .unwrap();

        assert_eq!(codec.verify(&token), Ok(5));
    }

    #[test]
    fn non_positive_user_id_is_invalid() {
        let codec = codec();
        let token = codec.issue(0).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn lifetime_that_overflows_the_clock_is_refused() {
        for ttl in [i64::MAX as u64, u64::MAX] {
            let codec = TokenCodec::new(b"secret", ttl, 0);
            assert!(matches!(codec.issue(1), Err(AppError::Internal)), "{ttl}");
        }
    }

    #[test]
    fn longest_accepted_lifetime_still_verifies() {
        let codec = TokenCodec::new(b"secret", MAX_TOKEN_WINDOW_SECONDS, 0);
        let token = codec.issue(3).unwrap();

        assert_eq!(codec.verify(&token), Ok(3));
    }
}
