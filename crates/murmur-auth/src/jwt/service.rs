//! Token service: issues credential pairs and verifies them, rotating access tokens near expiry.
//!
//! Access tokens use a soft-expiry policy: a correctly signed access token
//! that has expired, or that expires within the renewal window, is reissued
//! during verification instead of failing the caller. Refresh tokens are
//! never reissued here; only an explicit re-login produces a new one.

use chrono::{DateTime, Utc};
use tracing::debug;

use murmur_core::config::AuthConfig;

use super::claims::{Claims, TokenType};
use super::decoder::JwtDecoder;
use super::encoder::{JwtEncoder, TokenPair};
use super::error::TokenError;

/// Result of a rotating access-token verification.
#[derive(Debug, Clone)]
pub struct VerifiedAccess {
    /// The token the caller should use from now on. Equal to the input
    /// unless `rotated` is set.
    pub token: String,
    /// Claims of `token`.
    pub claims: Claims,
    /// Whether `token` was freshly issued during this verification.
    pub rotated: bool,
}

/// Issues and verifies paired access/refresh credentials.
#[derive(Debug, Clone)]
pub struct TokenService {
    /// Signs new tokens.
    encoder: JwtEncoder,
    /// Verifies token signatures.
    decoder: JwtDecoder,
    /// Tokens expiring within this window are reissued on verification.
    renewal_window: chrono::Duration,
}

impl TokenService {
    /// Creates a token service from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            renewal_window: chrono::Duration::hours(config.renewal_window_hours as i64),
        }
    }

    /// Issues a new access + refresh pair for `subject`.
    pub fn issue(&self, subject: murmur_core::types::SubjectId) -> Result<TokenPair, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(
        &self,
        subject: murmur_core::types::SubjectId,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        self.encoder.generate_token_pair(subject, now)
    }

    /// Issues a fresh access token for `subject`, valid for a full access TTL.
    pub fn reissue_access(
        &self,
        subject: murmur_core::types::SubjectId,
    ) -> Result<(String, Claims), TokenError> {
        self.encoder.generate_access_token(subject, Utc::now())
    }

    /// Verifies an access token, reissuing it when expired or close to expiry.
    ///
    /// Fails only if the token is malformed or not signed with the access key.
    pub fn verify_access(&self, token: &str) -> Result<VerifiedAccess, TokenError> {
        self.verify_access_at(token, Utc::now())
    }

    fn verify_access_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedAccess, TokenError> {
        let claims = self.decoder.decode_signed(token, TokenType::Access)?;

        let expired = claims.is_expired_at(now);
        if !expired && claims.remaining_at(now) > self.renewal_window {
            return Ok(VerifiedAccess {
                token: token.to_string(),
                claims,
                rotated: false,
            });
        }

        let (rotated_token, rotated_claims) =
            self.encoder.generate_access_token(claims.subject_id(), now)?;

        debug!(
            subject_id = %claims.subject_id(),
            expired,
            old_expires_at = %claims.expires_at(),
            new_expires_at = %rotated_claims.expires_at(),
            "Access token rotated"
        );

        Ok(VerifiedAccess {
            token: rotated_token,
            claims: rotated_claims,
            rotated: true,
        })
    }

    /// Verifies an access token without rotation. Expired tokens fail.
    pub fn verify_access_strict(&self, token: &str) -> Result<Claims, TokenError> {
        self.decoder
            .decode_strict(token, TokenType::Access, Utc::now())
    }

    /// Verifies a refresh token. Refresh tokens are never rotated.
    ///
    /// Every failure, expiry included, is reported as [`TokenError::Invalid`].
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_refresh_at(token, Utc::now())
    }

    fn verify_refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.decoder
            .decode_strict(token, TokenType::Refresh, now)
            .map_err(|e| match e {
                TokenError::Invalid(_) => e,
                other => TokenError::Invalid(other.to_string()),
            })
    }

    /// Verifies an access/refresh exchange.
    ///
    /// The refresh token is checked strictly, the access token with rotation
    /// tolerated, and the two must name the same subject. Returns the
    /// refresh claims and the (possibly rotated) access token.
    pub fn verify_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(Claims, VerifiedAccess), TokenError> {
        let refresh = self.verify_refresh(refresh_token)?;
        let access = self.verify_access(access_token)?;

        if access.claims.subject_id() != refresh.subject_id() {
            return Err(TokenError::Invalid(
                "access and refresh tokens belong to different subjects".to_string(),
            ));
        }

        Ok((refresh, access))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::types::SubjectId;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::default())
    }

    fn days(n: i64) -> chrono::Duration {
        chrono::Duration::days(n)
    }

    #[test]
    fn test_pair_verifies_to_same_subject() {
        let svc = service();
        let subject = SubjectId::new();
        let pair = svc.issue(subject).unwrap();

        let access = svc.verify_access_strict(&pair.access_token).unwrap();
        let refresh = svc.verify_refresh(&pair.refresh_token).unwrap();

        assert_eq!(access.subject_id(), subject);
        assert_eq!(refresh.subject_id(), subject);
        assert_eq!(access.iat, refresh.iat);
        assert!(pair.refresh_expires_at > pair.access_expires_at);
    }

    #[test]
    fn test_fresh_access_token_returned_unchanged() {
        let svc = service();
        let pair = svc.issue(SubjectId::new()).unwrap();

        let verified = svc.verify_access(&pair.access_token).unwrap();
        assert!(!verified.rotated);
        assert_eq!(verified.token, pair.access_token);
    }

    #[test]
    fn test_expired_access_token_is_reissued() {
        let svc = service();
        let subject = SubjectId::new();
        let now = Utc::now();
        let pair = svc.issue_at(subject, now - days(31)).unwrap();
        assert!(pair.access_expires_at < now);

        let verified = svc.verify_access_at(&pair.access_token, now).unwrap();
        assert!(verified.rotated);
        assert_ne!(verified.token, pair.access_token);
        assert_eq!(verified.claims.subject_id(), subject);
        assert!(verified.claims.expires_at() > pair.access_expires_at);

        let strict = svc.verify_access_strict(&verified.token).unwrap();
        assert_eq!(strict.subject_id(), subject);
    }

    #[test]
    fn test_access_token_inside_renewal_window_is_reissued() {
        let svc = service();
        let subject = SubjectId::new();
        let now = Utc::now();
        // Expires six hours from now, inside the 12-hour window.
        let issued = now - days(30) + chrono::Duration::hours(6);
        let pair = svc.issue_at(subject, issued).unwrap();
        assert!(pair.access_expires_at > now);

        let verified = svc.verify_access_at(&pair.access_token, now).unwrap();
        assert!(verified.rotated);
        assert_ne!(verified.token, pair.access_token);
        assert_eq!(verified.claims.subject_id(), subject);
        assert!(verified.claims.expires_at() > pair.access_expires_at);
    }

    #[test]
    fn test_access_token_just_outside_window_is_kept() {
        let svc = service();
        let now = Utc::now();
        let issued = now - days(30) + chrono::Duration::hours(13);
        let pair = svc.issue_at(SubjectId::new(), issued).unwrap();

        let verified = svc.verify_access_at(&pair.access_token, now).unwrap();
        assert!(!verified.rotated);
    }

    #[test]
    fn test_strict_rejects_expired_access_token() {
        let svc = service();
        let pair = svc.issue_at(SubjectId::new(), Utc::now() - days(31)).unwrap();

        let err = svc.verify_access_strict(&pair.access_token).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn test_strict_gives_access_tokens_no_leeway() {
        let svc = service();
        let access_ttl = chrono::Duration::hours(AuthConfig::default().access_ttl_hours as i64);
        let issued = Utc::now() - access_ttl - chrono::Duration::seconds(2);
        let pair = svc.issue_at(SubjectId::new(), issued).unwrap();

        let err = svc.verify_access_strict(&pair.access_token).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn test_refresh_token_tolerates_clock_skew() {
        let svc = service();
        let subject = SubjectId::new();
        let refresh_ttl = days(AuthConfig::default().refresh_ttl_days as i64);
        let now = Utc::now();
        let pair = svc
            .issue_at(subject, now - refresh_ttl - chrono::Duration::seconds(2))
            .unwrap();
        assert!(pair.refresh_expires_at < now);

        let claims = svc.verify_refresh_at(&pair.refresh_token, now).unwrap();
        assert_eq!(claims.subject_id(), subject);
    }

    #[test]
    fn test_reissue_access_mints_new_token() {
        let svc = service();
        let subject = SubjectId::new();
        let pair = svc.issue(subject).unwrap();

        let (token, claims) = svc.reissue_access(subject).unwrap();
        assert_ne!(token, pair.access_token);
        assert_eq!(claims.subject_id(), subject);
        assert_eq!(svc.verify_access_strict(&token).unwrap().jti, claims.jti);
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let svc = service();
        let pair = svc.issue(SubjectId::new()).unwrap();
        let (head, signature) = pair.access_token.rsplit_once('.').unwrap();
        let mut signature: Vec<char> = signature.chars().collect();
        signature[5] = if signature[5] == 'x' { 'y' } else { 'x' };
        let tampered = format!("{head}.{}", signature.into_iter().collect::<String>());

        assert!(matches!(
            svc.verify_access(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let svc = service();
        assert!(matches!(
            svc.verify_access("not-a-token"),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = service();
        let pair = svc.issue(SubjectId::new()).unwrap();
        assert!(matches!(
            svc.verify_access(&pair.refresh_token),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            svc.verify_refresh(&pair.access_token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_refresh_token_is_invalid() {
        let svc = service();
        let now = Utc::now();
        let pair = svc.issue_at(SubjectId::new(), now - days(800)).unwrap();
        assert!(matches!(
            svc.verify_refresh_at(&pair.refresh_token, now),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_mismatched_pair_rejected() {
        let svc = service();
        let alice = svc.issue(SubjectId::new()).unwrap();
        let mallory = svc.issue(SubjectId::new()).unwrap();

        assert!(matches!(
            svc.verify_pair(&alice.access_token, &mallory.refresh_token),
            Err(TokenError::Invalid(_))
        ));
        assert!(svc
            .verify_pair(&alice.access_token, &alice.refresh_token)
            .is_ok());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let svc = service();
        let other = TokenService::new(&AuthConfig {
            access_secret: "some-other-access-secret".to_string(),
            ..AuthConfig::default()
        });
        let pair = other.issue(SubjectId::new()).unwrap();
        assert!(matches!(
            svc.verify_access(&pair.access_token),
            Err(TokenError::Invalid(_))
        ));
    }
}
