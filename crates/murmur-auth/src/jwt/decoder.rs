//! JWT signature verification and claim extraction.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use murmur_core::config::AuthConfig;

use super::claims::{Claims, TokenType};
use super::error::TokenError;

/// Verifies JWT signatures with per-type keys.
///
/// Expiry is left to the caller: [`decode_strict`](Self::decode_strict)
/// rejects expired tokens, the token service renews them.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC key for access tokens.
    access_key: DecodingKey,
    /// HMAC key for refresh tokens.
    refresh_key: DecodingKey,
    /// Signature-only validation.
    validation: Validation,
    /// Clock skew tolerance for strict expiry checks.
    leeway: chrono::Duration,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            access_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
            leeway: chrono::Duration::seconds(config.leeway_seconds as i64),
        }
    }

    /// Verifies the signature of a token of the given type and returns its
    /// claims without considering expiry.
    pub fn decode_signed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let key = match expected {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };

        let claims = decode::<Claims>(token, key, &self.validation)?.claims;

        if claims.token_type != expected {
            return Err(TokenError::Invalid(format!(
                "expected {expected} token, got {}",
                claims.token_type
            )));
        }

        Ok(claims)
    }

    /// Verifies signature, type, and expiry at `now`.
    ///
    /// Access tokens get no leeway: one past `exp` is expired. Refresh tokens
    /// tolerate `leeway_seconds` of clock skew.
    pub fn decode_strict(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let claims = self.decode_signed(token, expected)?;
        let leeway = match expected {
            TokenType::Access => chrono::Duration::zero(),
            TokenType::Refresh => self.leeway,
        };
        if claims.is_expired_at(now - leeway) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
