//! Application builder: wires router, middleware, and state into an Axum app,
//! and runs it until shutdown.

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use murmur_core::error::AppError;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state).layer(TraceLayer::new_for_http())
}

/// Serves the application on `listener` until `shutdown` resolves.
///
/// The real-time engine is shut down when the signal fires, closing every
/// open socket.
pub async fn run_server<F>(state: AppState, listener: TcpListener, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener
        .local_addr()
        .map_err(|e| AppError::internal(format!("Failed to read bound address: {e}")))?;
    info!(address = %local_addr, "Murmur server listening");

    let realtime = state.realtime.clone();
    let app = build_app(state);

    // Upgraded sockets are not tracked by the server; closing the hub ends them.
    let hub_on_signal = realtime.clone();
    let signal = async move {
        shutdown.await;
        hub_on_signal.shutdown().await;
    };

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")));

    realtime.shutdown().await;
    info!("Murmur server stopped");
    result
}

/// Binds the configured address.
pub async fn bind(state: &AppState) -> Result<TcpListener, AppError> {
    let address = state.config.server.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {address}: {e}")))
}
