//! JWT token creation with per-type signing keys and TTLs.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use murmur_core::config::AuthConfig;
use murmur_core::types::SubjectId;

use super::claims::{Claims, TokenType};
use super::error::TokenError;

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC key for access tokens.
    access_key: EncodingKey,
    /// HMAC key for refresh tokens.
    refresh_key: EncodingKey,
    /// Access token lifetime.
    access_ttl: chrono::Duration,
    /// Refresh token lifetime.
    refresh_ttl: chrono::Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// A freshly issued access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: chrono::Duration::hours(config.access_ttl_hours as i64),
            refresh_ttl: chrono::Duration::days(config.refresh_ttl_days as i64),
        }
    }

    /// Generates an access + refresh pair for `subject`, both issued at `now`.
    pub fn generate_token_pair(
        &self,
        subject: SubjectId,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let (access_token, access_claims) = self.generate_access_token(subject, now)?;

        let refresh_claims = Claims::new(subject, TokenType::Refresh, now, self.refresh_ttl);
        let refresh_token = self.sign(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_claims.expires_at(),
            refresh_expires_at: refresh_claims.expires_at(),
        })
    }

    /// Generates a standalone access token (initial issue or rotation).
    pub fn generate_access_token(
        &self,
        subject: SubjectId,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), TokenError> {
        let claims = Claims::new(subject, TokenType::Access, now, self.access_ttl);
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    /// Signs claims with the key matching their token type.
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let key = match claims.token_type {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };
        encode(&Header::default(), claims, key).map_err(|e| TokenError::Signing(e.to_string()))
    }
}
