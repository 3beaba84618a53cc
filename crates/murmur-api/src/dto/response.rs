//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use murmur_auth::jwt::TokenPair;
use murmur_core::traits::Identity;
use murmur_core::types::{MessageId, SubjectId};
use murmur_realtime::HubStats;
use murmur_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Identity summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// Subject ID.
    pub id: SubjectId,
    /// Username.
    pub username: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            created_at: identity.created_at,
        }
    }
}

/// Login and registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
    /// Identity info.
    pub identity: IdentityResponse,
}

impl LoginResponse {
    /// Builds the response from a freshly issued pair.
    pub fn new(identity: Identity, tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
            identity: identity.into(),
        }
    }
}

/// Refresh response. The refresh token is echoed back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// Access token to use from now on.
    pub access_token: String,
    /// Its expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token.
    pub refresh_token: String,
}

/// Accepted broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Message ID assigned to the broadcast.
    pub message_id: MessageId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the hub is not running.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Live registry snapshot, absent when the hub is not running.
    pub hub: Option<HubStats>,
    /// Hub counters.
    pub metrics: MetricsSnapshot,
}
