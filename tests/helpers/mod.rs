//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use murmur_api::AppState;
use murmur_auth::MemoryIdentityStore;
use murmur_core::config::AppConfig;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the hub directly
    pub state: AppState,
    /// Identity directory backing the app
    pub identities: Arc<MemoryIdentityStore>,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a new test application with `config`
    pub async fn with_config(config: AppConfig) -> Self {
        let identities = Arc::new(MemoryIdentityStore::new());
        let state = AppState::new(config, identities.clone());
        let router = murmur_api::build_app(state.clone());

        Self {
            router,
            state,
            identities,
        }
    }

    /// Register an identity and return the response data
    pub async fn register(&self, username: &str, password: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );

        response.body["data"].clone()
    }

    /// Register an identity and return its access token
    pub async fn register_token(&self, username: &str) -> String {
        self.register(username, "password123").await["access_token"]
            .as_str()
            .expect("No access_token in register response")
            .to_string()
    }

    /// Login and return JWT access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        send(&self.router, method, path, body, token).await
    }
}

/// Make an HTTP request against `router`
pub async fn send(
    router: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> TestResponse {
    let body_str = body
        .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
        .unwrap_or_default();

    let mut req = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        req = req.header("Authorization", format!("Bearer {}", token));
    }

    let req = req
        .body(Body::from(body_str))
        .expect("Failed to build request");

    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

/// A server listening on an ephemeral local port
pub struct TestServer {
    /// In-process app sharing the server's state
    pub app: TestApp,
    /// Bound address
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server with default configuration
    pub async fn spawn() -> Self {
        let app = TestApp::new().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let state = app.state.clone();
        let task = tokio::spawn(async move {
            murmur_api::run_server(state, listener, async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server failed");
        });

        Self {
            app,
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// WebSocket URL carrying `token`
    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    /// Trigger graceful shutdown and wait for the server to stop
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.expect("Server task panicked");
        }
    }

    /// Wait until the hub holds exactly `n` connections
    pub async fn wait_for_connections(&self, n: usize) {
        for _ in 0..200 {
            let stats = self
                .app
                .state
                .realtime
                .hub()
                .stats()
                .await
                .expect("Hub stopped");
            if stats.connections == n {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("hub never reached {n} connections");
    }
}
