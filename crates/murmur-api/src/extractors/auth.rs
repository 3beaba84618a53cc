//! `AuthUser` extractor: the caller authenticated by the session-renewal middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use murmur_auth::session::AuthenticatedSubject;
use murmur_core::error::AppError;

/// Extracted authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedSubject);

impl std::ops::Deref for AuthUser {
    type Target = AuthenticatedSubject;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubject>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::authentication("Authentication required"))
    }
}
