//! Realtime hub metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level metric counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections registered with the hub
    connections_opened: AtomicU64,
    /// Connection queues closed by the hub
    connections_closed: AtomicU64,
    /// Broadcasts accepted by the hub loop
    broadcasts_accepted: AtomicU64,
    /// Messages enqueued onto connection queues
    deliveries: AtomicU64,
    /// Messages dropped because a queue was full or closed
    deliveries_dropped: AtomicU64,
    /// Inbound frames accepted from clients
    inbound_accepted: AtomicU64,
    /// Inbound frames rejected by validation
    inbound_rejected: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a queue close
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted broadcast
    pub fn broadcast_accepted(&self) {
        self.broadcasts_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record successful enqueues
    pub fn delivered(&self, count: u64) {
        self.deliveries.fetch_add(count, Ordering::Relaxed);
    }

    /// Record dropped enqueues
    pub fn dropped(&self, count: u64) {
        self.deliveries_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an accepted inbound frame
    pub fn inbound_accepted(&self) {
        self.inbound_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected inbound frame
    pub fn inbound_rejected(&self) {
        self.inbound_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: opened,
            connections_closed: closed,
            connections_active: opened.saturating_sub(closed),
            broadcasts_accepted: self.broadcasts_accepted.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            inbound_accepted: self.inbound_accepted.load(Ordering::Relaxed),
            inbound_rejected: self.inbound_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_opened: u64,
    /// Connection queues closed
    pub connections_closed: u64,
    /// Registered minus closed
    pub connections_active: u64,
    /// Broadcasts accepted by the hub
    pub broadcasts_accepted: u64,
    /// Messages enqueued
    pub deliveries: u64,
    /// Messages dropped
    pub deliveries_dropped: u64,
    /// Inbound frames accepted
    pub inbound_accepted: u64,
    /// Inbound frames rejected
    pub inbound_rejected: u64,
}
