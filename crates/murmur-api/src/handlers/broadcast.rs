//! Broadcast submission over HTTP.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use murmur_core::error::AppError;
use murmur_realtime::OutboundMessage;

use crate::dto::request::BroadcastRequest;
use crate::dto::response::{ApiResponse, BroadcastResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/broadcast
pub async fn broadcast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BroadcastRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BroadcastResponse>>), AppError> {
    if req.payload.is_null() {
        return Err(AppError::validation("Payload is required"));
    }

    let size = serde_json::to_vec(&req.payload)?.len();
    let limit = state.config.realtime.max_message_bytes;
    if size > limit {
        return Err(AppError::validation(format!(
            "Payload exceeds maximum size of {limit} bytes"
        )));
    }

    let message = OutboundMessage::broadcast(auth.identity.id, req.payload);
    let message_id = message.id();
    state.realtime.hub().broadcast(message).await?;

    tracing::debug!(
        subject_id = %auth.identity.id,
        message_id = %message_id,
        "Broadcast submitted over HTTP"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::ok(BroadcastResponse { message_id })),
    ))
}
