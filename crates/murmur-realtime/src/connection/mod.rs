//! WebSocket connections: handles, frames, and the reader/writer pair.

pub mod frame;
pub mod handle;
pub mod session;

pub use frame::Frame;
pub use handle::{ConnectionHandle, Delivery};
pub use session::{Connection, ConnectionSummary};
