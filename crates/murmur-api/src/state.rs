//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use murmur_auth::jwt::TokenService;
use murmur_auth::password::PasswordHasher;
use murmur_auth::session::SessionManager;
use murmur_core::config::AppConfig;
use murmur_core::traits::IdentityStore;
use murmur_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Identity directory
    pub identities: Arc<dyn IdentityStore>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,

    // ── Realtime ─────────────────────────────────────────────
    /// Real-time engine (hub + connections)
    pub realtime: Arc<RealtimeEngine>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session_manager", &self.session_manager)
            .field("realtime", &self.realtime)
            .finish()
    }
}

impl AppState {
    /// Wires the auth stack around `identities` and starts the real-time
    /// engine on the current runtime.
    pub fn new(config: AppConfig, identities: Arc<dyn IdentityStore>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.auth));
        let session_manager = Arc::new(SessionManager::new(
            tokens,
            Arc::clone(&identities),
            Arc::new(PasswordHasher::new()),
            config.auth.clone(),
        ));
        let realtime = Arc::new(RealtimeEngine::start(config.realtime.clone()));

        Self {
            config: Arc::new(config),
            identities,
            session_manager,
            realtime,
        }
    }
}
