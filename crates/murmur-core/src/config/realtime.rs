//! Real-time WebSocket hub configuration.

use serde::{Deserialize, Serialize};

/// What the hub does when a connection's outbound queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Drop the message for that connection only and keep the loop moving.
    #[default]
    Drop,
    /// Wait for queue capacity. One stalled consumer stalls every broadcast.
    Block,
}

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound queue.
    #[serde(default = "default_outbound_capacity")]
    pub outbound_queue_capacity: usize,
    /// Capacity of the hub's input channel.
    #[serde(default = "default_hub_buffer")]
    pub hub_buffer_size: usize,
    /// Full-queue behavior for broadcast fan-out.
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_capacity(),
            hub_buffer_size: default_hub_buffer(),
            delivery_policy: DeliveryPolicy::default(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_outbound_capacity() -> usize {
    10
}

fn default_hub_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}
