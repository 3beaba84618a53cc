//! Core type definitions used across the Murmur workspace.

pub mod id;

pub use id::*;
