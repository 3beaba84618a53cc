//! In-process identity directory backed by concurrent maps.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use murmur_core::error::AppError;
use murmur_core::result::AppResult;
use murmur_core::traits::{Identity, IdentityStore};
use murmur_core::types::SubjectId;

/// Stored identity with its credential hash.
#[derive(Debug, Clone)]
struct IdentityRecord {
    identity: Identity,
    password_hash: String,
}

/// Identity store kept entirely in memory.
///
/// Usernames are matched case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    /// Subject id → record.
    by_id: DashMap<SubjectId, IdentityRecord>,
    /// Lowercased username → subject id.
    by_username: DashMap<String, SubjectId>,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft-deletes an identity. Returns `false` if it does not exist.
    pub fn mark_deleted(&self, id: &SubjectId) -> bool {
        match self.by_id.get_mut(id) {
            Some(mut record) => {
                record.identity.deleted_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// Number of stored identities, deleted ones included.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if the store holds no identities.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_active(&self, id: &SubjectId) -> AppResult<Option<Identity>> {
        Ok(self
            .by_id
            .get(id)
            .map(|record| record.identity.clone())
            .filter(Identity::is_active))
    }

    async fn create(&self, username: &str, password_hash: String) -> AppResult<Identity> {
        let key = username.to_lowercase();
        let identity = Identity {
            id: SubjectId::new(),
            username: username.to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        };

        match self.by_username.entry(key) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!(
                    "Username '{username}' is already taken"
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(identity.id);
            }
        }

        self.by_id.insert(
            identity.id,
            IdentityRecord {
                identity: identity.clone(),
                password_hash,
            },
        );

        Ok(identity)
    }

    async fn find_credentials(&self, username: &str) -> AppResult<Option<(Identity, String)>> {
        let Some(id) = self.by_username.get(&username.to_lowercase()).map(|e| *e) else {
            return Ok(None);
        };

        Ok(self
            .by_id
            .get(&id)
            .filter(|record| record.identity.is_active())
            .map(|record| (record.identity.clone(), record.password_hash.clone())))
    }
}
