//! Identity directory implementations.

pub mod memory;

pub use memory::MemoryIdentityStore;
