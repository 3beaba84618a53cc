//! Top-level real-time engine owning the hub task.

use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use murmur_core::config::RealtimeConfig;
use murmur_core::types::SubjectId;

use crate::connection::Connection;
use crate::hub::{Hub, HubHandle};

/// Central real-time engine: starts the hub and hands out connections.
pub struct RealtimeEngine {
    /// Handle to the running hub.
    hub: HubHandle,
    /// Realtime settings applied to new connections.
    config: RealtimeConfig,
    /// Stops the hub loop.
    shutdown: CancellationToken,
    /// Hub loop task, taken on shutdown.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("config", &self.config)
            .field("running", &!self.hub.is_closed())
            .finish()
    }
}

impl RealtimeEngine {
    /// Starts the hub on the current runtime.
    pub fn start(config: RealtimeConfig) -> Self {
        let shutdown = CancellationToken::new();
        let (hub, task) = Hub::spawn(&config, shutdown.clone());

        info!(
            outbound_queue_capacity = config.outbound_queue_capacity,
            hub_buffer_size = config.hub_buffer_size,
            "Real-time engine initialized"
        );

        Self {
            hub,
            config,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Handle to the hub.
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Realtime settings.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Prepares a connection for an authenticated subject.
    pub fn connect(&self, subject_id: SubjectId) -> Connection {
        Connection::new(subject_id, self.hub.clone(), &self.config)
    }

    /// Stops the hub, closing every connection, and waits for the loop to exit.
    pub async fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.shutdown.cancel();

        let task = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Hub task ended abnormally");
            }
        }

        info!("Real-time engine shut down");
    }
}
