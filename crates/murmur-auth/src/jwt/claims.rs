//! JWT claims structure used in access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use murmur_core::types::{SubjectId, TokenId};

/// JWT claims payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject the token is bound to.
    pub sub: SubjectId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: TokenId,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token verified on every request; eligible for rotation.
    Access,
    /// Long-lived token used to re-establish a session; never rotated.
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

impl Claims {
    /// Builds claims for `subject` issued at `now` and living for `ttl`.
    pub fn new(
        subject: SubjectId,
        token_type: TokenType,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: TokenId::new(),
            token_type,
        }
    }

    /// Returns the subject id.
    pub fn subject_id(&self) -> SubjectId {
        self.sub
    }

    /// Returns the issue time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Checks whether this token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Returns the remaining lifetime at `now` (zero if expired).
    pub fn remaining_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        let remaining = self.exp - now.timestamp();
        chrono::Duration::seconds(remaining.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundaries() {
        let now = Utc::now();
        let claims = Claims::new(
            SubjectId::new(),
            TokenType::Access,
            now,
            chrono::Duration::hours(1),
        );
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + chrono::Duration::hours(1)));
        assert_eq!(claims.remaining_at(now), chrono::Duration::hours(1));
        assert_eq!(
            claims.remaining_at(now + chrono::Duration::hours(2)),
            chrono::Duration::zero()
        );
    }

    #[test]
    fn test_token_type_wire_name() {
        let json = serde_json::to_string(&TokenType::Refresh).unwrap();
        assert_eq!(json, "\"refresh\"");
    }
}
