//! Session lifecycle flows built on the token service.

pub mod manager;

pub use manager::{AuthenticatedSubject, RefreshedSession, SessionGrant, SessionManager};
