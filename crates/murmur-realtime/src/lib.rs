//! # murmur-realtime
//!
//! Real-time delivery engine for Murmur. Provides:
//!
//! - A single-owner connection hub: one coordinating task owns the registry
//!   of live connections and serializes register, unregister, and broadcast
//! - Per-device connections: one subject may hold many sockets at once
//! - A reader/writer task pair per connection, joined at teardown
//! - Tagged JSON wire messages and inbound validation
//! - Hub metrics

pub mod connection;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod server;

pub use connection::{Connection, ConnectionHandle, ConnectionSummary, Frame};
pub use hub::{Hub, HubHandle, HubStats};
pub use message::OutboundMessage;
pub use metrics::RealtimeMetrics;
pub use server::RealtimeEngine;
