use crate::error::ServerResult;
use crate::middleware::TenantId;
use crate::state::ServerState;
use crate::store::StoredMessage;
use crate::validation::validate_message;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use faqbot::{contains_keywords, AnswerSource, ChatRole, ChatTurn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Widget chat request
#[derive(Debug, Deserialize)]
pub struct ChatQueryRequest {
    pub message: String,

    /// Prior turns of this conversation, forwarded to the model only
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// Widget chat response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatQueryResponse {
    pub message: String,
    pub role: ChatRole,
    pub source: AnswerSource,
}

/// Answer a visitor message: FAQ match, then fallback or model
pub async fn chat_query(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(mut request): Json<ChatQueryRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_message(&request.message)?;
    // visitors cannot supply system instructions
    request.history.retain(|turn| turn.role != ChatRole::System);

    let kb = state.knowledge_base(&tenant_id)?;
    let settings = state.settings_or_default(&tenant_id)?;

    let answer = state
        .pipeline
        .answer(&request.message, &kb, settings.ai_mode, &request.history)
        .await?;

    tracing::info!(
        tenant_id = %tenant_id,
        source = answer.source.as_str(),
        faq_id = answer.faq_id.as_deref().unwrap_or(""),
        "chat query answered"
    );

    state.store.append_messages(
        &tenant_id,
        vec![
            StoredMessage::new(ChatRole::User, request.message),
            StoredMessage::new(ChatRole::Assistant, answer.message.clone()),
        ],
    )?;

    Ok(Json(ChatQueryResponse {
        message: answer.message,
        role: ChatRole::Assistant,
        source: answer.source,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub threshold: f64,
    /// Id of the FAQ the chat endpoint would answer with
    pub best_match: Option<String>,
    pub candidates: Vec<ExplainCandidate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainCandidate {
    pub id: String,
    pub question: String,
    /// `None` when the length prefilter skipped the entry
    pub score: Option<f64>,
    pub keyword_overlap: bool,
}

/// Score a message against every FAQ of the tenant without answering it
pub async fn explain_match(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
    Json(request): Json<ExplainRequest>,
) -> ServerResult<impl IntoResponse> {
    validate_message(&request.message)?;

    let faqs = state.store.list_faqs(&tenant_id)?;
    let matcher = state.pipeline.matcher();
    let best_match = matcher
        .find_best_match(&request.message, &faqs)
        .map(|hit| hit.entry.id.clone());

    let candidates = matcher
        .score_all(&request.message, &faqs)
        .into_iter()
        .zip(&faqs)
        .map(|(scored, faq)| ExplainCandidate {
            id: scored.id,
            question: faq.question.clone(),
            score: scored.score,
            keyword_overlap: contains_keywords(&request.message, faq),
        })
        .collect();

    Ok(Json(ExplainResponse {
        threshold: matcher.threshold(),
        best_match,
        candidates,
    }))
}
