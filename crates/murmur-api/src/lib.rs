//! # murmur-api
//!
//! HTTP API layer for Murmur built on Axum.
//!
//! Provides the auth endpoints, HTTP broadcast submission, the WebSocket
//! upgrade, session-renewal and logging middleware, extractors, and DTOs.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{bind, build_app, run_server};
pub use state::AppState;
