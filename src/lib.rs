//! Workspace umbrella crate for faqbot.
//!
//! This crate stitches the FAQ matcher and the LLM collaborator into a single
//! answer pipeline: a chat message is first matched against the tenant's FAQ
//! list, and only when nothing is close enough does the pipeline fall back to
//! the model (or to a static message when the tenant disabled AI answers).

pub mod config;
pub mod llm;

pub use config::{ConfigLoadError, FaqbotConfig, FallbackYamlConfig, LlmYamlConfig, MatcherYamlConfig};
pub use llm::{
    CannedResponder, ChatRole, ChatTurn, CompletionRequest, LlmClient, LlmError, OpenAiClient,
    OpenAiConfig, RetryConfig, build_system_prompt,
};
pub use matcher::{
    DEFAULT_THRESHOLD, FaqEntry, FaqMatcher, MatchConfig, MatchError, MatchMetrics, MatchResult,
    contains_keywords, find_best_match, set_match_metrics, similarity,
};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Reply used when no FAQ matched and the tenant turned AI answers off.
pub const DEFAULT_FALLBACK_MESSAGE: &str =
    "Thanks for reaching out! I don't have an answer for that yet. Please contact our support team and we'll get back to you.";

/// A tenant's knowledge base snapshot for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeBase {
    pub website_description: String,
    pub faqs: Vec<FaqEntry>,
}

/// Where an answer came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Verbatim answer of a matched FAQ entry.
    Faq,
    /// Generated by the LLM collaborator.
    Ai,
    /// Static message for tenants with AI answers disabled.
    Fallback,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerSource::Faq => "faq",
            AnswerSource::Ai => "ai",
            AnswerSource::Fallback => "fallback",
        }
    }
}

/// Result of answering one chat message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Answer {
    pub message: String,
    pub source: AnswerSource,
    /// Matched FAQ id when `source` is `Faq`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Errors that can occur while answering a message.
///
/// "No FAQ matched" is not an error; it routes to the model or the fallback.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("answer generation failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Metrics observer for answer outcomes.
pub trait PipelineMetrics: Send + Sync {
    fn record_answer(&self, source: AnswerSource, latency: Duration);
    fn record_llm(&self, provider: &str, latency: Duration, result: Result<(), &LlmError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// FAQ-first answer pipeline with LLM fallback.
#[derive(Clone)]
pub struct AnswerPipeline {
    matcher: FaqMatcher,
    llm: Arc<dyn LlmClient>,
    fallback_message: String,
}

impl AnswerPipeline {
    pub fn new(matcher: FaqMatcher, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            matcher,
            llm,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn matcher(&self) -> &FaqMatcher {
        &self.matcher
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    /// Answer `message` for a tenant.
    ///
    /// `ai_enabled` is the tenant's setting; `history` holds prior turns and
    /// is only forwarded to the model.
    pub async fn answer(
        &self,
        message: &str,
        kb: &KnowledgeBase,
        ai_enabled: bool,
        history: &[ChatTurn],
    ) -> Result<Answer, PipelineError> {
        let start = Instant::now();

        let answer = if let Some(hit) = self.matcher.find_best_match(message, &kb.faqs) {
            tracing::debug!(faq_id = %hit.entry.id, score = hit.score, "answered from faq");
            Answer {
                message: hit.entry.answer.clone(),
                source: AnswerSource::Faq,
                faq_id: Some(hit.entry.id.clone()),
                score: Some(hit.score),
            }
        } else if !ai_enabled {
            tracing::debug!("no faq match and ai disabled, using fallback");
            Answer {
                message: self.fallback_message.clone(),
                source: AnswerSource::Fallback,
                faq_id: None,
                score: None,
            }
        } else {
            let request = CompletionRequest::new(kb, history, message);
            let llm_start = Instant::now();
            let result = self.llm.complete(&request).await;

            if let Some(recorder) = metrics_recorder() {
                recorder.record_llm(self.llm.name(), llm_start.elapsed(), result.as_ref().map(|_| ()));
            }

            let reply = result.inspect_err(|err| {
                tracing::error!(provider = self.llm.name(), error = %err, "llm completion failed");
            })?;

            Answer {
                message: reply,
                source: AnswerSource::Ai,
                faq_id: None,
                score: None,
            }
        };

        if let Some(recorder) = metrics_recorder() {
            recorder.record_answer(answer.source, start.elapsed());
        }

        Ok(answer)
    }
}

impl std::fmt::Debug for AnswerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerPipeline")
            .field("matcher", &self.matcher)
            .field("llm", &self.llm.name())
            .field("fallback_message", &self.fallback_message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::Http {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    #[derive(Default)]
    struct CountingLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("model says hi ({} turns)", request.history.len()))
        }
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase {
            website_description: "We fix bikes.".into(),
            faqs: vec![FaqEntry::new(
                "1",
                "How do I reset my password?",
                "Go to settings > reset password.",
            )],
        }
    }

    fn pipeline(llm: Arc<dyn LlmClient>) -> AnswerPipeline {
        AnswerPipeline::new(FaqMatcher::default(), llm)
    }

    #[tokio::test]
    async fn faq_match_skips_the_model() {
        let llm = Arc::new(CountingLlm::default());
        let answer = pipeline(llm.clone())
            .answer("how can i reset my password", &kb(), true, &[])
            .await
            .expect("answer");

        assert_eq!(answer.source, AnswerSource::Faq);
        assert_eq!(answer.message, "Go to settings > reset password.");
        assert_eq!(answer.faq_id.as_deref(), Some("1"));
        assert!(answer.score.expect("score") >= 0.6);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_match_goes_to_model_with_history() {
        let llm = Arc::new(CountingLlm::default());
        let history = vec![ChatTurn::user("hello"), ChatTurn::assistant("hi!")];
        let answer = pipeline(llm.clone())
            .answer("do you repair e-bikes as well?", &kb(), true, &history)
            .await
            .expect("answer");

        assert_eq!(answer.source, AnswerSource::Ai);
        assert_eq!(answer.message, "model says hi (2 turns)");
        assert_eq!(answer.faq_id, None);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ai_disabled_uses_fallback() {
        let llm = Arc::new(CountingLlm::default());
        let answer = pipeline(llm.clone())
            .with_fallback_message("Please email us.")
            .answer("do you repair e-bikes as well?", &kb(), false, &[])
            .await
            .expect("answer");

        assert_eq!(answer.source, AnswerSource::Fallback);
        assert_eq!(answer.message, "Please email us.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ai_disabled_still_answers_from_faq() {
        let answer = pipeline(Arc::new(FailingLlm))
            .answer("How do I reset my password?", &kb(), false, &[])
            .await
            .expect("answer");
        assert_eq!(answer.source, AnswerSource::Faq);
    }

    #[tokio::test]
    async fn model_failure_is_an_error_not_a_miss() {
        let err = pipeline(Arc::new(FailingLlm))
            .answer("something unrelated entirely", &kb(), true, &[])
            .await
            .expect_err("model failure surfaces");
        assert!(matches!(err, PipelineError::Llm(LlmError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn empty_knowledge_base_goes_to_model() {
        let llm = Arc::new(CountingLlm::default());
        let answer = pipeline(llm)
            .answer("hello", &KnowledgeBase::default(), true, &[])
            .await
            .expect("answer");
        assert_eq!(answer.source, AnswerSource::Ai);
    }

    #[test]
    fn answer_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AnswerSource::Faq).unwrap(), "\"faq\"");
        assert_eq!(serde_json::to_string(&AnswerSource::Ai).unwrap(), "\"ai\"");
        assert_eq!(AnswerSource::Fallback.as_str(), "fallback");
    }
}
