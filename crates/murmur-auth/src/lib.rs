//! # murmur-auth
//!
//! Session lifecycle for Murmur: signed access/refresh credentials with
//! sliding renewal, password hashing, and the identity directory.
//!
//! ## Modules
//!
//! - `jwt`: claims, signing, verification, and the rotating [`TokenService`]
//! - `password`: Argon2id password hashing
//! - `identity`: in-memory [`IdentityStore`](murmur_core::traits::IdentityStore)
//! - `session`: register, login, refresh, and request authentication flows

pub mod identity;
pub mod jwt;
pub mod password;
pub mod session;

pub use identity::MemoryIdentityStore;
pub use jwt::{Claims, TokenError, TokenPair, TokenService, TokenType, VerifiedAccess};
pub use password::PasswordHasher;
pub use session::{AuthenticatedSubject, SessionManager};
