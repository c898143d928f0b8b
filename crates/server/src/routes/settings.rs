use crate::error::ServerResult;
use crate::middleware::TenantId;
use crate::state::ServerState;
use crate::store::ChatbotSettings;
use crate::validation::{
    parse_position, require_text, validate_color, MAX_GREETING_CHARS, MAX_NAME_CHARS,
};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    /// `None` until the tenant saves settings for the first time
    pub settings: Option<ChatbotSettings>,
}

#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    pub name: String,
    pub color: String,
    pub greeting: String,
    pub position: String,
    /// Omitted keeps the current value
    #[serde(default)]
    pub ai_mode: Option<bool>,
}

pub async fn get_settings(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let settings = state.store.settings(&tenant_id)?;
    Ok(Json(SettingsResponse { settings }))
}

/// Create or replace the widget settings
pub async fn save_settings(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(request): Json<SaveSettingsRequest>,
) -> ServerResult<impl IntoResponse> {
    require_text("name", &request.name, MAX_NAME_CHARS)?;
    validate_color(&request.color)?;
    require_text("greeting", &request.greeting, MAX_GREETING_CHARS)?;
    let position = parse_position(&request.position)?;

    let ai_mode = match request.ai_mode {
        Some(ai_mode) => ai_mode,
        None => state.settings_or_default(&tenant_id)?.ai_mode,
    };

    let settings = ChatbotSettings {
        name: request.name,
        color: request.color,
        greeting: request.greeting,
        position,
        ai_mode,
    };
    state.store.put_settings(&tenant_id, &settings)?;

    tracing::info!(tenant_id = %tenant_id, ai_mode, "settings saved");
    Ok(Json(serde_json::json!({ "success": true, "settings": settings })))
}
