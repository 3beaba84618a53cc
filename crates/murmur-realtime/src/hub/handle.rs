//! Cloneable request handle for the hub loop.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use murmur_core::error::AppError;
use murmur_core::result::AppResult;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

use super::command::HubCommand;
use super::coordinator::HubStats;

/// Sends requests to the hub loop.
///
/// Every method fails with a service-unavailable error once the loop has
/// stopped.
#[derive(Debug, Clone)]
pub struct HubHandle {
    /// Hub input channel.
    commands: mpsc::Sender<HubCommand>,
    /// Metrics shared with the loop.
    metrics: Arc<RealtimeMetrics>,
}

impl HubHandle {
    pub(crate) fn new(commands: mpsc::Sender<HubCommand>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { commands, metrics }
    }

    /// Registers a connection under its subject.
    pub async fn register(&self, connection: Arc<ConnectionHandle>) -> AppResult<()> {
        self.send(HubCommand::Register(connection)).await
    }

    /// Unregisters a connection and closes its outbound queue.
    ///
    /// Safe to call any number of times for the same connection.
    pub async fn unregister(&self, connection: Arc<ConnectionHandle>) -> AppResult<()> {
        self.send(HubCommand::Unregister(connection)).await
    }

    /// Submits a message for delivery to every registered connection.
    pub async fn broadcast(&self, message: OutboundMessage) -> AppResult<()> {
        self.send(HubCommand::Broadcast(message)).await
    }

    /// Returns a snapshot of the registry, ordered after every request this
    /// handle sent before it.
    pub async fn stats(&self) -> AppResult<HubStats> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::Stats(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| AppError::service_unavailable("Realtime hub stopped before replying"))
    }

    /// Returns the hub metrics.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }

    /// Returns `true` once the hub loop has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: HubCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::service_unavailable("Realtime hub is not running"))
    }
}
