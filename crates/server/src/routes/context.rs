use crate::error::ServerResult;
use crate::middleware::TenantId;
use crate::state::ServerState;
use crate::store::{ChatbotSettings, WidgetPosition};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use faqbot::FaqEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_QUICK_REPLIES: usize = 4;
const MAX_LABEL_CHARS: usize = 40;
const TRUNCATED_LABEL_CHARS: usize = 37;

const DEFAULT_QUICK_REPLIES: [(&str, &str, &str); 4] = [
    (
        "default-1",
        "Learn More",
        "I'd be happy to tell you more about our services!",
    ),
    (
        "default-2",
        "Contact Support",
        "You can reach our support team anytime. How can I assist you?",
    ),
    (
        "default-3",
        "Pricing",
        "Let me help you with pricing information!",
    ),
    (
        "default-4",
        "Get Started",
        "Great! Let's get you started. What would you like to know?",
    ),
];

/// Button shown above the widget input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuickReply {
    pub id: String,
    pub label: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub name: String,
    pub color: String,
    pub greeting: String,
    pub position: WidgetPosition,
    pub ai_mode: bool,
    pub quick_replies: Vec<QuickReply>,
}

/// Everything the widget needs on load
#[derive(Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    pub website_description: String,
    pub faqs: Vec<FaqEntry>,
    pub settings: WidgetSettings,
}

fn quick_reply_label(question: &str) -> String {
    if question.chars().count() > MAX_LABEL_CHARS {
        let head: String = question.chars().take(TRUNCATED_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        question.to_string()
    }
}

/// First four FAQs as quick replies, or the defaults when there are none
pub fn quick_replies(faqs: &[FaqEntry]) -> Vec<QuickReply> {
    if faqs.is_empty() {
        return DEFAULT_QUICK_REPLIES
            .iter()
            .map(|(id, label, response)| QuickReply {
                id: id.to_string(),
                label: label.to_string(),
                response: response.to_string(),
            })
            .collect();
    }

    faqs.iter()
        .take(MAX_QUICK_REPLIES)
        .enumerate()
        .map(|(i, faq)| QuickReply {
            id: format!("faq-{i}"),
            label: quick_reply_label(&faq.question),
            response: faq.answer.clone(),
        })
        .collect()
}

/// Widget bootstrap: description, FAQs, settings and quick replies
pub async fn get_context(
    State(state): State<Arc<ServerState>>,
    Extension(TenantId(tenant_id)): Extension<TenantId>,
) -> ServerResult<impl IntoResponse> {
    let kb = state.knowledge_base(&tenant_id)?;
    let ChatbotSettings {
        name,
        color,
        greeting,
        position,
        ai_mode,
    } = state.settings_or_default(&tenant_id)?;

    let quick_replies = quick_replies(&kb.faqs);

    Ok(Json(ContextResponse {
        website_description: kb.website_description,
        faqs: kb.faqs,
        settings: WidgetSettings {
            name,
            color,
            greeting,
            position,
            ai_mode,
            quick_replies,
        },
    }))
}
