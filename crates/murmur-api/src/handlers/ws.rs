//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt, future};
use tracing::debug;

use murmur_core::error::AppError;
use murmur_realtime::{Connection, Frame};

use crate::dto::request::WsQuery;
use crate::state::AppState;

/// GET /ws?token={jwt}: WebSocket upgrade
///
/// The token is verified strictly before the upgrade; a rotated token could
/// not be returned to the client through the handshake.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let identity = state
        .session_manager
        .authenticate_strict(&query.token)
        .await?;

    debug!(subject_id = %identity.id, "WebSocket upgrade authorized");

    let connection = state.realtime.connect(identity.id);
    let max_frame = state.config.realtime.max_message_bytes;

    Ok(ws
        .max_message_size(max_frame.saturating_mul(2))
        .on_upgrade(move |socket| serve_socket(connection, socket)))
}

/// Adapts an upgraded socket to frames and serves it.
async fn serve_socket(connection: Connection, socket: WebSocket) {
    let (ws_tx, ws_rx) = socket.split();

    let sink = ws_tx.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(into_message(frame))));
    let stream = ws_rx.map(|result| result.map(from_message));

    connection.serve(sink, stream).await;
}

fn into_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(bytes) => Message::Binary(bytes.into()),
        Frame::Ping(bytes) => Message::Ping(bytes.into()),
        Frame::Pong(bytes) => Message::Pong(bytes.into()),
        Frame::Close => Message::Close(None),
    }
}

fn from_message(message: Message) -> Frame {
    match message {
        Message::Text(text) => Frame::Text(text.as_str().to_owned()),
        Message::Binary(bytes) => Frame::Binary(bytes.to_vec()),
        Message::Ping(bytes) => Frame::Ping(bytes.to_vec()),
        Message::Pong(bytes) => Frame::Pong(bytes.to_vec()),
        Message::Close(_) => Frame::Close,
    }
}
