//! API route handlers
//!
//! Routes are organized by who calls them:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `chat`: Widget chat queries and match diagnostics
//! - `context`: Widget bootstrap (description, FAQs, settings, quick replies)
//! - `knowledge`: Website description and FAQ management
//! - `settings`: Widget appearance and AI toggle
//! - `stats`: Message statistics
//! - `apikey`: API key lookup, rotation and provisioning

pub mod apikey;
pub mod chat;
pub mod context;
pub mod health;
pub mod knowledge;
pub mod settings;
pub mod stats;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Root endpoint (GET /), no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "faqbot Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/chat/query",
            "/api/v1/context",
            "/api/v1/website",
            "/api/v1/faq",
            "/api/v1/settings",
            "/api/v1/stats",
            "/api/v1/apikey",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Route".to_string())
}
