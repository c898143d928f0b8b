//! LLM collaborator used when no FAQ entry is close enough.
//!
//! The pipeline only needs "prompt in, answer out, or failure", expressed by
//! the [`LlmClient`] trait. Two implementations ship with the crate:
//!
//! - [`OpenAiClient`]: any OpenAI-compatible chat-completions endpoint.
//! - [`CannedResponder`]: offline templated replies for development and tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::KnowledgeBase;

/// Reply used when the completion endpoint answers without any content.
pub const EMPTY_COMPLETION_REPLY: &str = "I apologize, but I could not generate a response.";

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One prior message, passed to the model verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything the model sees for one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub history: Vec<ChatTurn>,
    pub user_message: String,
}

impl CompletionRequest {
    pub fn new(kb: &KnowledgeBase, history: &[ChatTurn], user_message: &str) -> Self {
        Self {
            system_prompt: build_system_prompt(kb),
            history: history.to_vec(),
            user_message: user_message.to_string(),
        }
    }

    /// Flattened message list: system prompt, history, then the new message.
    pub fn messages(&self) -> Vec<ChatTurn> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatTurn {
            role: ChatRole::System,
            content: self.system_prompt.clone(),
        });
        messages.extend(self.history.iter().cloned());
        messages.push(ChatTurn::user(self.user_message.clone()));
        messages
    }
}

/// System prompt seeded with the tenant's website description and FAQs.
pub fn build_system_prompt(kb: &KnowledgeBase) -> String {
    let faqs = kb
        .faqs
        .iter()
        .enumerate()
        .map(|(i, faq)| format!("{}. Q: {}\n   A: {}", i + 1, faq.question, faq.answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are a helpful customer support assistant for a company.\n\n\
         Website Information:\n{}\n\n\
         Available FAQs:\n{}\n\n\
         Provide helpful, accurate, and friendly responses based on this information.",
        kb.website_description, faqs
    )
}

/// Errors surfaced by LLM clients.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    #[error("invalid llm config: {0}")]
    InvalidConfig(String),
    /// Connection, DNS or timeout failure before a response arrived.
    #[error("llm transport error: {0}")]
    Transport(String),
    #[error("llm endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("could not decode llm response: {0}")]
    Decode(String),
}

impl LlmError {
    /// Transport failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Http { status, .. } => *status == 429 || *status >= 500,
            LlmError::InvalidConfig(_) | LlmError::Decode(_) => false,
        }
    }
}

/// Completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Short provider name for logs and metrics.
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Exponential backoff between completion attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (1-based); attempt 0 is immediate.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponential = self.base_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);
        let capped = exponential.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full URL of the chat-completions endpoint.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl OpenAiConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.openai.com/v1/chat/completions";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Chat-completions client over `reqwest`.
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig("api_key must not be empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(LlmError::InvalidConfig("model must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| LlmError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Request body in the chat-completions wire format.
    pub fn request_body(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .messages()
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content }))
            .collect();

        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }

    async fn send_once(&self, body: &Value) -> Result<String, LlmError> {
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        Ok(extract_completion(&payload))
    }
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn extract_completion(payload: &Value) -> String {
    match payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
    {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => {
            tracing::warn!("completion response had no content");
            EMPTY_COMPLETION_REPLY.to_string()
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = self.request_body(request);
        let retry = self.config.retry;
        let mut attempt = 0u32;

        loop {
            match self.send_once(&body).await {
                Ok(answer) => return Ok(answer),
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    attempt += 1;
                    let delay = retry.calculate_delay(attempt);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "llm request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Offline responder with templated replies.
///
/// The reply is chosen from the message length, so the same message always
/// gets the same answer.
#[derive(Debug, Clone, Default)]
pub struct CannedResponder;

impl CannedResponder {
    pub fn new() -> Self {
        Self
    }

    /// Render the reply for `message` against `website_description`.
    pub fn reply(&self, message: &str, website_description: &str) -> String {
        let excerpt: String = website_description.chars().take(100).collect();
        match message.chars().count() % 3 {
            0 => format!(
                "Based on our website information: {excerpt}... I'd be happy to help you with \"{message}\". Could you provide more details?"
            ),
            1 => format!(
                "Thank you for your question about \"{message}\". According to our information, we specialize in providing excellent service. How can I assist you further?"
            ),
            _ => format!(
                "I understand you're asking about \"{message}\". Let me help you with that based on our services and offerings."
            ),
        }
    }
}

#[async_trait]
impl LlmClient for CannedResponder {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let description = request
            .system_prompt
            .split_once("Website Information:\n")
            .and_then(|(_, rest)| rest.split_once("\n\nAvailable FAQs:"))
            .map(|(description, _)| description)
            .unwrap_or_default();
        Ok(self.reply(&request.user_message, description))
    }
}
