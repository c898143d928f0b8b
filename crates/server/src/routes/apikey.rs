use crate::error::ServerResult;
use crate::middleware::TenantId;
use crate::state::ServerState;
use crate::validation::validate_id;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const API_KEY_PREFIX: &str = "dlg_";

/// `dlg_` followed by 32 random bytes in hex
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    format!("{API_KEY_PREFIX}{}", hex::encode(bytes))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateApiKeyRequest {
    pub external_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateApiKeyResponse {
    pub tenant_id: String,
    pub api_key: String,
}

/// Current key of the calling tenant
pub async fn get_api_key(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let api_key = state.store.api_key_for_tenant(&tenant_id)?;
    Ok(Json(ApiKeyResponse { api_key }))
}

/// Issue a new key for the calling tenant; the key used for this call stops working
pub async fn rotate_api_key(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let key = generate_api_key();
    state.store.replace_api_key(&tenant_id, &key)?;

    tracing::info!(tenant_id = %tenant_id, "api key rotated");
    Ok(Json(ApiKeyResponse { api_key: Some(key) }))
}

/// Find or create the tenant for an external id and issue it a fresh key
pub async fn provision_api_key(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<GenerateApiKeyRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_id("external_id", &request.external_id)?;

    let tenant = state.store.find_or_create_tenant(&request.external_id)?;
    let key = generate_api_key();
    state.store.replace_api_key(&tenant.id, &key)?;

    tracing::info!(tenant_id = %tenant.id, "api key provisioned");
    Ok(Json(GenerateApiKeyResponse {
        tenant_id: tenant.id,
        api_key: key,
    }))
}
