//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section falls back to its defaults when absent.

pub mod app;
pub mod auth;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::{DeliveryPolicy, RealtimeConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration files
/// (default.toml + environment overlay + `MURMUR__` environment variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Real-time hub settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with the `config/{env}.toml` overlay and
    /// environment variables prefixed with `MURMUR__`, then validates.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MURMUR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.access_secret.is_empty() || self.auth.refresh_secret.is_empty() {
            return Err(AppError::configuration("Signing secrets must not be empty"));
        }
        if self.auth.access_secret == self.auth.refresh_secret {
            return Err(AppError::configuration(
                "Access and refresh tokens must use distinct signing secrets",
            ));
        }
        if self.auth.access_ttl_hours == 0 || self.auth.refresh_ttl_days == 0 {
            return Err(AppError::configuration("Token lifetimes must be positive"));
        }
        if self.realtime.outbound_queue_capacity == 0 || self.realtime.hub_buffer_size == 0 {
            return Err(AppError::configuration("Realtime buffer sizes must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.realtime.outbound_queue_capacity, 10);
        assert_eq!(config.auth.renewal_window_hours, 12);
        assert_eq!(config.realtime.delivery_policy, DeliveryPolicy::Drop);
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.refresh_secret = config.auth.access_secret.clone();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.access_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[realtime]\ndelivery_policy = \"block\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.realtime.delivery_policy, DeliveryPolicy::Block);
        assert_eq!(config.realtime.outbound_queue_capacity, 10);
        assert_eq!(config.server.port, 8080);
    }
}
