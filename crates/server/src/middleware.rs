use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

/// Tenant resolved from the request's API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantId(pub String);

/// Request correlation id, echoed in the `x-request-id` response header.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Key from `x-api-key` or `Authorization: Bearer <key>`.
fn extract_key(headers: &HeaderMap, header: &str) -> Option<String> {
    headers
        .get(header)
        .or_else(|| headers.get(AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Tenant API key authentication middleware
///
/// Inserts [`TenantId`] into the request extensions on success.
pub async fn api_key_auth(
    State(state): State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(key) = extract_key(request.headers(), "x-api-key") else {
        return Err(ServerError::Authentication(
            "API key required. Provide it in 'X-API-Key' or 'Authorization: Bearer <key>' header"
                .to_string(),
        ));
    };

    let Some(tenant_id) = state.tenant_for_key(&key)? else {
        tracing::warn!("rejected request with unknown API key");
        return Err(ServerError::Authentication("Invalid API key".to_string()));
    };

    if !state.check_rate_limit(&key) {
        tracing::warn!(tenant_id = %tenant_id, "rate limit exceeded");
        return Err(ServerError::RateLimitExceeded);
    }

    request.extensions_mut().insert(TenantId(tenant_id));
    Ok(next.run(request).await)
}

/// Admin key authentication for tenant provisioning
pub async fn admin_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(key) = extract_key(request.headers(), "x-admin-key") else {
        return Err(ServerError::Authentication(
            "Admin key required. Provide it in 'X-Admin-Key' or 'Authorization: Bearer <key>' header"
                .to_string(),
        ));
    };

    if !state.is_admin_key(&key) {
        tracing::warn!("rejected admin request");
        return Err(ServerError::Forbidden("Admin key not recognized".to_string()));
    }

    Ok(next.run(request).await)
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}
