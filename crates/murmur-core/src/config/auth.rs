//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and lifetime configuration.
///
/// Access and refresh tokens are signed with independent secrets so a leaked
/// access secret cannot mint refresh tokens and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default = "default_access_secret")]
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    #[serde(default = "default_refresh_secret")]
    pub refresh_secret: String,
    /// Access token TTL in hours.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_hours: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Access tokens expiring within this many hours are reissued on verification.
    #[serde(default = "default_renewal_window")]
    pub renewal_window_hours: u64,
    /// Clock skew tolerance in seconds for refresh-token expiry. Strict
    /// access verification applies none.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Minimum password length at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Returns `true` if either secret still carries its shipped default.
    pub fn uses_default_secrets(&self) -> bool {
        self.access_secret == default_access_secret()
            || self.refresh_secret == default_refresh_secret()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: default_access_secret(),
            refresh_secret: default_refresh_secret(),
            access_ttl_hours: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            renewal_window_hours: default_renewal_window(),
            leeway_seconds: default_leeway(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_access_ttl() -> u64 {
    24 * 30
}

fn default_refresh_ttl() -> u64 {
    365 * 2
}

fn default_renewal_window() -> u64 {
    12
}

fn default_leeway() -> u64 {
    5
}

fn default_password_min() -> usize {
    8
}
