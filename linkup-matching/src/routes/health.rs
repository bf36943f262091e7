use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use linkup_shared::clients::db;
use linkup_shared::types::api::{HealthCheck, HealthResponse};

use crate::AppState;

/// Probes Postgres and Redis.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let pool = state.db.clone();
    let database = tokio::task::spawn_blocking(move || db::ping(&pool))
        .await
        .unwrap_or_else(|e| Err(anyhow::anyhow!(e)));

    let checks = vec![
        HealthCheck::from_result("database", database),
        HealthCheck::from_result("redis", state.redis.ping().await),
    ];

    let response = HealthResponse::healthy("linkup-matching", env!("CARGO_PKG_VERSION"))
        .with_checks(checks);

    (response.http_status(), Json(response)).into_response()
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
