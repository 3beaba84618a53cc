//! Connection hub, the single owner of the live-connection registry.
//!
//! One coordinating task ([`Hub::run`]) receives register, unregister,
//! broadcast, and stats requests over one FIFO channel and processes them one
//! at a time. Every other component holds a cloneable [`HubHandle`] and only
//! ever sends requests; nothing outside the loop can read or write the
//! registry.

mod command;
pub mod coordinator;
pub mod handle;

pub use coordinator::{Hub, HubStats};
pub use handle::HubHandle;
