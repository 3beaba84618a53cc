//! Outbound wire message definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use murmur_core::types::{MessageId, SubjectId};

/// Messages the server delivers to clients.
///
/// Serialized as internally tagged JSON, e.g.
/// `{"type":"broadcast","id":"…","sender":"…","payload":{…},"sent_at":"…"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A message fanned out to every registered connection.
    Broadcast {
        /// Unique message ID.
        id: MessageId,
        /// Subject that originated the broadcast.
        sender: SubjectId,
        /// Opaque client payload.
        payload: serde_json::Value,
        /// When the hub accepted the message for delivery.
        sent_at: DateTime<Utc>,
    },
}

impl OutboundMessage {
    /// Builds a broadcast from `sender` carrying `payload`.
    pub fn broadcast(sender: SubjectId, payload: serde_json::Value) -> Self {
        Self::Broadcast {
            id: MessageId::new(),
            sender,
            payload,
            sent_at: Utc::now(),
        }
    }

    /// Returns the message id.
    pub fn id(&self) -> MessageId {
        match self {
            Self::Broadcast { id, .. } => *id,
        }
    }
}
