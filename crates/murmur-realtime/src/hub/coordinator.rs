//! The hub coordinating task and its registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use murmur_core::config::{DeliveryPolicy, RealtimeConfig};
use murmur_core::types::{ConnectionId, SubjectId};

use crate::connection::handle::{ConnectionHandle, Delivery};
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

use super::command::HubCommand;
use super::handle::HubHandle;

/// Subject → that subject's live connections.
type Registry = HashMap<SubjectId, HashMap<ConnectionId, Arc<ConnectionHandle>>>;

/// Read-only snapshot of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubStats {
    /// Subjects with at least one live connection.
    pub subjects: usize,
    /// Live connections across all subjects.
    pub connections: usize,
    /// Live connection count per subject.
    pub per_subject: HashMap<SubjectId, usize>,
}

impl HubStats {
    /// Live connection count for one subject (0 if absent).
    pub fn connections_for(&self, subject: &SubjectId) -> usize {
        self.per_subject.get(subject).copied().unwrap_or(0)
    }
}

/// Single-writer owner of the connection registry.
#[derive(Debug)]
pub struct Hub {
    /// Live connections. Touched only inside [`Hub::run`].
    registry: Registry,
    /// Hub input.
    commands: mpsc::Receiver<HubCommand>,
    /// Full-queue behavior.
    policy: DeliveryPolicy,
    /// Metrics shared with every handle.
    metrics: Arc<RealtimeMetrics>,
    /// Stops the loop.
    shutdown: CancellationToken,
}

impl Hub {
    /// Creates a hub and the handle used to reach it.
    pub fn new(config: &RealtimeConfig, shutdown: CancellationToken) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(config.hub_buffer_size.max(1));
        let metrics = Arc::new(RealtimeMetrics::new());

        let hub = Self {
            registry: HashMap::new(),
            commands: rx,
            policy: config.delivery_policy,
            metrics: metrics.clone(),
            shutdown,
        };

        (hub, HubHandle::new(tx, metrics))
    }

    /// Creates a hub and spawns its loop on the current runtime.
    pub fn spawn(
        config: &RealtimeConfig,
        shutdown: CancellationToken,
    ) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(config, shutdown);
        (handle, tokio::spawn(hub.run()))
    }

    /// Runs the coordinating loop until shutdown is requested or every
    /// handle is dropped, then closes every remaining connection.
    pub async fn run(mut self) {
        info!(policy = ?self.policy, "Realtime hub started");

        loop {
            let command = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            match command {
                HubCommand::Register(connection) => self.register(connection),
                HubCommand::Unregister(connection) => self.unregister(&connection),
                HubCommand::Broadcast(message) => self.broadcast(message).await,
                HubCommand::Stats(reply) => {
                    let _ = reply.send(self.stats());
                }
            }
        }

        self.close_all();
        info!("Realtime hub stopped");
    }

    fn register(&mut self, connection: Arc<ConnectionHandle>) {
        if connection.is_closed() {
            debug!(conn_id = %connection.id, "Ignoring registration of closed connection");
            return;
        }

        let subject = connection.subject_id;
        let conn_id = connection.id;
        let devices = self.registry.entry(subject).or_default();
        devices.insert(conn_id, connection);
        let device_count = devices.len();

        self.metrics.connection_opened();

        info!(
            conn_id = %conn_id,
            subject_id = %subject,
            devices = device_count,
            "Connection registered"
        );
    }

    fn unregister(&mut self, connection: &Arc<ConnectionHandle>) {
        let subject = connection.subject_id;

        let removed = match self.registry.get_mut(&subject) {
            Some(devices) => {
                let removed = devices.remove(&connection.id).is_some();
                if devices.is_empty() {
                    self.registry.remove(&subject);
                }
                removed
            }
            None => false,
        };

        if connection.close() && removed {
            self.metrics.connection_closed();
        }

        if removed {
            info!(conn_id = %connection.id, subject_id = %subject, "Connection unregistered");
        } else {
            debug!(conn_id = %connection.id, "Unregister for absent connection ignored");
        }
    }

    async fn broadcast(&self, message: OutboundMessage) {
        self.metrics.broadcast_accepted();
        let message = Arc::new(message);

        let mut delivered = 0u64;
        let mut dropped = 0u64;

        for connection in self.registry.values().flat_map(HashMap::values) {
            let outcome = match self.policy {
                DeliveryPolicy::Drop => connection.try_deliver(message.clone()),
                DeliveryPolicy::Block => tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => {
                        warn!(
                            conn_id = %connection.id,
                            message_id = %message.id(),
                            "Shutdown while waiting for queue capacity, abandoning broadcast"
                        );
                        break;
                    }
                    outcome = connection.deliver(message.clone()) => outcome,
                },
            };

            match outcome {
                Delivery::Delivered => delivered += 1,
                Delivery::Full => {
                    dropped += 1;
                    warn!(
                        conn_id = %connection.id,
                        message_id = %message.id(),
                        "Outbound queue full, dropping message"
                    );
                }
                Delivery::Closed => {
                    dropped += 1;
                    debug!(conn_id = %connection.id, "Outbound queue closed, skipping");
                }
            }
        }

        self.metrics.delivered(delivered);
        self.metrics.dropped(dropped);

        debug!(
            message_id = %message.id(),
            delivered,
            dropped,
            "Broadcast fanned out"
        );
    }

    fn stats(&self) -> HubStats {
        let per_subject: HashMap<SubjectId, usize> = self
            .registry
            .iter()
            .map(|(subject, devices)| (*subject, devices.len()))
            .collect();

        HubStats {
            subjects: per_subject.len(),
            connections: per_subject.values().sum(),
            per_subject,
        }
    }

    fn close_all(&mut self) {
        let mut closed = 0usize;
        for (_, devices) in self.registry.drain() {
            for (_, connection) in devices {
                if connection.close() {
                    self.metrics.connection_closed();
                    closed += 1;
                }
            }
        }
        info!(count = closed, "All connections closed");
    }
}
