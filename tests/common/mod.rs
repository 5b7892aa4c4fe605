#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use inventory_api::{
    config::{AppConfig, InstanceRole},
    db::{self, DbConfig, DbPool},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// In-memory SQLite pool with the schema applied. One connection keeps the
/// database alive for the whole test.
pub async fn memory_pool() -> Arc<DbPool> {
    let pool = db::establish_connection_with_config(&DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    })
    .await
    .expect("failed to create in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations");
    Arc::new(pool)
}

pub fn test_config(role: InstanceRole) -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
    );
    cfg.instance_role = role.as_str().to_string();
    cfg.db_max_connections = 1;
    cfg
}

/// Helper harness wrapping the application router over a test database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_role(InstanceRole::Primary).await
    }

    pub async fn with_role(role: InstanceRole) -> Self {
        Self::from_pool(memory_pool().await, test_config(role))
    }

    /// Primary instance whose price lookup targets `base_url`.
    pub async fn with_price_lookup(base_url: &str) -> Self {
        let mut cfg = test_config(InstanceRole::Primary);
        cfg.price_lookup_api_key = Some("test-key".to_string());
        cfg.price_lookup_api_host = Some("shopping.test".to_string());
        cfg.price_lookup_base_url = Some(base_url.to_string());
        cfg.price_lookup_timeout_secs = 2;
        Self::from_pool(memory_pool().await, cfg)
    }

    /// Builds an instance over an existing pool so two roles can share one store.
    pub fn from_pool(pool: Arc<DbPool>, cfg: AppConfig) -> Self {
        let state = AppState::new(pool, cfg).expect("failed to build app state");
        let router = inventory_api::app_router(state.clone());
        Self { router, state }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Serves the router on an ephemeral local port and returns its base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .await
                .expect("test server failed");
        });
        format!("http://{}", addr)
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// A local URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("ephemeral address");
    drop(listener);
    format!("http://{}", addr)
}
