//! Identity lookup boundary.
//!
//! The session layer only ever learns a subject id from a verified token.
//! Whether that subject still exists is answered by an [`IdentityStore`];
//! a missing or deleted identity is an authentication failure, never a
//! token or hub error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::SubjectId;

/// Public profile of an authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Subject identifier.
    pub id: SubjectId,
    /// Login name.
    pub username: String,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// Soft-delete marker. Deleted identities never authenticate.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Returns `true` if the identity has not been deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Resolves subjects to identities and checks login credentials.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Finds a present, non-deleted identity by subject id.
    async fn find_active(&self, id: &SubjectId) -> AppResult<Option<Identity>>;

    /// Creates a new identity with the given password hash.
    ///
    /// Fails with a conflict error if the username is taken.
    async fn create(&self, username: &str, password_hash: String) -> AppResult<Identity>;

    /// Finds an active identity by username along with its stored password hash.
    async fn find_credentials(&self, username: &str) -> AppResult<Option<(Identity, String)>>;
}
