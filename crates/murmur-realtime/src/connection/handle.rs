//! Individual connection handle shared between a connection's tasks and the hub.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use murmur_core::types::{ConnectionId, SubjectId};

use crate::message::types::OutboundMessage;

/// Outcome of enqueuing one message onto a connection's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message is queued.
    Delivered,
    /// The queue is at capacity; the message was not queued.
    Full,
    /// The queue has been closed.
    Closed,
}

/// A handle to one live connection.
///
/// Owns the sending half of the outbound queue. The queue is closed at most
/// once, tracked by an explicit flag rather than by registry membership, so
/// racing unregistrations can never close it twice.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Subject who owns this connection
    pub subject_id: SubjectId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound messages; `None` once closed
    sender: Mutex<Option<mpsc::Sender<Arc<OutboundMessage>>>>,
    /// Set exactly once, when the queue is closed
    closed: AtomicBool,
    /// Cancelled when the queue is closed
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new handle and the receiving half of its outbound queue.
    pub fn new(
        subject_id: SubjectId,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Arc<OutboundMessage>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Arc::new(Self {
            id: ConnectionId::new(),
            subject_id,
            connected_at: Utc::now(),
            sender: Mutex::new(Some(tx)),
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        });
        (handle, rx)
    }

    /// Check whether the outbound queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Token cancelled when the outbound queue is closed.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Close the outbound queue.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub(crate) fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.lock_sender().take();
        self.shutdown.cancel();
        true
    }

    /// Enqueue without waiting.
    pub(crate) fn try_deliver(&self, msg: Arc<OutboundMessage>) -> Delivery {
        let guard = self.lock_sender();
        let Some(sender) = guard.as_ref() else {
            return Delivery::Closed;
        };
        match sender.try_send(msg) {
            Ok(()) => Delivery::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Enqueue, waiting for queue capacity.
    pub(crate) async fn deliver(&self, msg: Arc<OutboundMessage>) -> Delivery {
        let sender = self.lock_sender().clone();
        match sender {
            Some(sender) => match sender.send(msg).await {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Closed,
            },
            None => Delivery::Closed,
        }
    }

    fn lock_sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<Arc<OutboundMessage>>>> {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
