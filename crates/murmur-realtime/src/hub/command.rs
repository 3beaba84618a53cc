//! Requests accepted by the hub loop.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;

use super::coordinator::HubStats;

/// One input event for the hub loop.
#[derive(Debug)]
pub(crate) enum HubCommand {
    /// Add a connection under its subject.
    Register(Arc<ConnectionHandle>),
    /// Remove a connection and close its queue. Idempotent.
    Unregister(Arc<ConnectionHandle>),
    /// Enqueue a message on every registered connection.
    Broadcast(OutboundMessage),
    /// Reply with a read-only registry snapshot.
    Stats(oneshot::Sender<HubStats>),
}
