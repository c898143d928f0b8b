use crate::error::{ServerError, ServerResult};
use crate::middleware::TenantId;
use crate::state::ServerState;
use crate::validation::{validate_description, validate_faq, validate_id};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use faqbot::FaqEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct WebsiteResponse {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveWebsiteRequest {
    pub description: String,
}

pub async fn get_website(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let description = state
        .store
        .website_description(&tenant_id)?
        .unwrap_or_default();
    Ok(Json(WebsiteResponse { description }))
}

/// Create or replace the website description
pub async fn save_website(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(request): Json<SaveWebsiteRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_description(&request.description)?;
    state
        .store
        .put_website_description(&tenant_id, &request.description)?;

    tracing::info!(tenant_id = %tenant_id, "website description saved");
    Ok(Json(WebsiteResponse {
        description: request.description,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaqListResponse {
    pub faqs: Vec<FaqEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaqResponse {
    pub success: bool,
    pub faq: FaqEntry,
}

#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFaqRequest {
    pub id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFaqRequest {
    pub id: String,
}

pub async fn list_faqs(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let faqs = state.store.list_faqs(&tenant_id)?;
    Ok(Json(FaqListResponse { faqs }))
}

pub async fn create_faq(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(request): Json<CreateFaqRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_faq(&request.question, &request.answer)?;
    let faq = state
        .store
        .create_faq(&tenant_id, &request.question, &request.answer)?;

    tracing::info!(tenant_id = %tenant_id, faq_id = %faq.id, "faq created");
    Ok(Json(FaqResponse { success: true, faq }))
}

/// Update a FAQ owned by the caller; 404 for anything else
pub async fn update_faq(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(request): Json<UpdateFaqRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_id("id", &request.id)?;
    validate_faq(&request.question, &request.answer)?;

    let faq = state
        .store
        .update_faq(&tenant_id, &request.id, &request.question, &request.answer)?
        .ok_or_else(|| ServerError::NotFound("FAQ".to_string()))?;

    tracing::info!(tenant_id = %tenant_id, faq_id = %faq.id, "faq updated");
    Ok(Json(FaqResponse { success: true, faq }))
}

/// Delete a FAQ owned by the caller; 404 for anything else
pub async fn delete_faq(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(request): Json<DeleteFaqRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_id("id", &request.id)?;

    if !state.store.delete_faq(&tenant_id, &request.id)? {
        return Err(ServerError::NotFound("FAQ".to_string()));
    }

    tracing::info!(tenant_id = %tenant_id, faq_id = %request.id, "faq deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
