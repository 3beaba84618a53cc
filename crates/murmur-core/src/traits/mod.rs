//! Core traits defined in `murmur-core` and implemented by other crates.

pub mod identity;

pub use identity::{Identity, IdentityStore};
