//! Session-renewal middleware for bearer-authenticated routes.
//!
//! Verifies the bearer access token with rotation tolerated, resolves the
//! identity, and stores the result in request extensions for the
//! [`AuthUser`](crate::extractors::AuthUser) extractor. When the token was
//! reissued the replacement is returned in the `x-access-token` header.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use murmur_core::error::AppError;

use crate::state::AppState;

/// Response header carrying a rotated access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Authenticates the request and forwards any rotated access token.
pub async fn session_renewal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?.to_owned();
    let subject = state.session_manager.authenticate(&token).await?;

    let rotated_token = if subject.rotated {
        let value = HeaderValue::from_str(&subject.access_token)
            .map_err(|e| AppError::internal(format!("Rotated token is not a valid header: {e}")))?;
        Some(value)
    } else {
        None
    };

    request.extensions_mut().insert(subject);
    let mut response = next.run(request).await;

    if let Some(value) = rotated_token {
        debug!("Returning rotated access token");
        response.headers_mut().insert(ACCESS_TOKEN_HEADER, value);
    }

    Ok(response)
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
}
