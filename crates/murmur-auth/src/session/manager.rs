//! Session lifecycle manager.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use murmur_core::config::AuthConfig;
use murmur_core::error::AppError;
use murmur_core::result::AppResult;
use murmur_core::traits::{Identity, IdentityStore};

use crate::jwt::{TokenPair, TokenService};
use crate::password::PasswordHasher;

/// Result of a successful registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionGrant {
    /// The authenticated identity.
    pub identity: Identity,
    /// Freshly issued token pair.
    pub tokens: TokenPair,
}

/// Result of an access/refresh exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedSession {
    /// Access token to use from now on.
    pub access_token: String,
    /// Its expiration.
    pub access_expires_at: DateTime<Utc>,
    /// The refresh token, returned unchanged.
    pub refresh_token: String,
}

/// A request-scoped, verified caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject {
    /// The resolved identity.
    pub identity: Identity,
    /// The access token the caller should adopt.
    pub access_token: String,
    /// Whether `access_token` was rotated during this authentication.
    pub rotated: bool,
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// Token issuance and verification.
    tokens: Arc<TokenService>,
    /// Identity lookup.
    identities: Arc<dyn IdentityStore>,
    /// Password hasher.
    password_hasher: Arc<PasswordHasher>,
    /// Auth configuration.
    config: AuthConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        tokens: Arc<TokenService>,
        identities: Arc<dyn IdentityStore>,
        password_hasher: Arc<PasswordHasher>,
        config: AuthConfig,
    ) -> Self {
        Self {
            tokens,
            identities,
            password_hasher,
            config,
        }
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Creates an identity and issues its first token pair.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<SessionGrant> {
        if password.chars().count() < self.config.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.config.password_min_length
            )));
        }

        let hash = self.password_hasher.hash_password(password)?;
        let identity = self.identities.create(username, hash).await?;
        let tokens = self.tokens.issue(identity.id)?;

        info!(subject_id = %identity.id, username = %identity.username, "Identity registered");

        Ok(SessionGrant { identity, tokens })
    }

    /// Checks credentials and issues a new token pair.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<SessionGrant> {
        let Some((identity, hash)) = self.identities.find_credentials(username).await? else {
            warn!(username = %username, "Login failed: unknown username");
            return Err(AppError::authentication("Invalid username or password"));
        };

        if !self.password_hasher.verify_password(password, &hash)? {
            warn!(subject_id = %identity.id, "Login failed: wrong password");
            return Err(AppError::authentication("Invalid username or password"));
        }

        let tokens = self.tokens.issue(identity.id)?;

        info!(subject_id = %identity.id, "Login succeeded");

        Ok(SessionGrant { identity, tokens })
    }

    /// Exchanges an access/refresh pair for a newly issued access token.
    ///
    /// A new access token is minted on every successful exchange, however
    /// long the presented one had left. The refresh token is never reissued;
    /// clients keep using it until it expires and they log in again.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> AppResult<RefreshedSession> {
        let (refresh_claims, access) = self.tokens.verify_pair(access_token, refresh_token)?;
        let subject = refresh_claims.subject_id();
        self.require_identity(&subject).await?;

        let (token, claims) = if access.rotated {
            (access.token, access.claims)
        } else {
            self.tokens.reissue_access(subject)?
        };

        info!(subject_id = %subject, "Access token refreshed");

        Ok(RefreshedSession {
            access_expires_at: claims.expires_at(),
            access_token: token,
            refresh_token: refresh_token.to_string(),
        })
    }

    /// Authenticates a request, rotating the access token if needed.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<AuthenticatedSubject> {
        let verified = self.tokens.verify_access(access_token)?;
        let identity = self.require_identity(&verified.claims.subject_id()).await?;

        Ok(AuthenticatedSubject {
            identity,
            access_token: verified.token,
            rotated: verified.rotated,
        })
    }

    /// Authenticates without rotation; expired tokens fail.
    ///
    /// Used where a rotated token could not be handed back to the caller,
    /// such as the WebSocket upgrade handshake.
    pub async fn authenticate_strict(&self, access_token: &str) -> AppResult<Identity> {
        let claims = self.tokens.verify_access_strict(access_token)?;
        self.require_identity(&claims.subject_id()).await
    }

    async fn require_identity(
        &self,
        subject: &murmur_core::types::SubjectId,
    ) -> AppResult<Identity> {
        self.identities
            .find_active(subject)
            .await?
            .ok_or_else(|| AppError::authentication("Unknown or deleted identity"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryIdentityStore;
    use murmur_core::error::ErrorKind;

    fn manager() -> (SessionManager, Arc<MemoryIdentityStore>) {
        let config = AuthConfig::default();
        let store = Arc::new(MemoryIdentityStore::new());
        let manager = SessionManager::new(
            Arc::new(TokenService::new(&config)),
            store.clone(),
            Arc::new(PasswordHasher::new()),
            config,
        );
        (manager, store)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (manager, _) = manager();
        let grant = manager.register("dana", "hunter2hunter2").await.unwrap();
        let login = manager.login("dana", "hunter2hunter2").await.unwrap();
        assert_eq!(grant.identity.id, login.identity.id);

        let subject = manager.authenticate(&login.tokens.access_token).await.unwrap();
        assert_eq!(subject.identity.id, grant.identity.id);
        assert!(!subject.rotated);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let (manager, _) = manager();
        let err = manager.register("erin", "short").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let (manager, _) = manager();
        manager.register("frank", "password123").await.unwrap();
        let err = manager.login("frank", "password124").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        let err = manager.login("nobody", "password123").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_deleted_identity_cannot_authenticate() {
        let (manager, store) = manager();
        let grant = manager.register("gina", "password123").await.unwrap();
        store.mark_deleted(&grant.identity.id);

        let err = manager
            .authenticate(&grant.tokens.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(manager
            .authenticate_strict(&grant.tokens.access_token)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_refresh_mints_access_and_keeps_refresh_token() {
        let (manager, _) = manager();
        let grant = manager.register("hank", "password123").await.unwrap();
        let refreshed = manager
            .refresh(&grant.tokens.access_token, &grant.tokens.refresh_token)
            .await
            .unwrap();
        assert_eq!(refreshed.refresh_token, grant.tokens.refresh_token);
        assert_ne!(refreshed.access_token, grant.tokens.access_token);
        assert!(refreshed.access_expires_at >= grant.tokens.access_expires_at);

        let identity = manager
            .authenticate_strict(&refreshed.access_token)
            .await
            .unwrap();
        assert_eq!(identity.id, grant.identity.id);
    }

    #[tokio::test]
    async fn test_refresh_rejects_foreign_pair() {
        let (manager, _) = manager();
        let ivy = manager.register("ivy", "password123").await.unwrap();
        let jack = manager.register("jack", "password123").await.unwrap();

        let err = manager
            .refresh(&ivy.tokens.access_token, &jack.tokens.refresh_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
