//! # murmur-core
//!
//! Core crate for Murmur. Contains configuration schemas, typed
//! identifiers, the identity lookup trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Murmur crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
