use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "faqbot-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Ready once the tenant store answers a ping.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    state.store.ping()?;

    Ok(Json(json!({
        "status": "ready",
        "service": "faqbot-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": "ready",
            "llm": state.pipeline.llm().name(),
            "match_threshold": state.pipeline.matcher().threshold(),
        }
    })))
}

/// Prometheus metrics endpoint
///
/// Text exposition when the exporter is installed, otherwise uptime only.
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    if !state.config.metrics_enabled {
        return Err(ServerError::NotFound("Metrics endpoint".to_string()));
    }

    match &state.metrics_handle {
        Some(handle) => Ok((
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response()),
        None => Ok(Json(json!({ "uptime_seconds": uptime_seconds() })).into_response()),
    }
}
