//! Prometheus wiring for the matcher and pipeline metrics hooks.

use faqbot::{AnswerSource, LlmError, PipelineMetrics};
use matcher::MatchMetrics;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;

/// Forwards matcher and pipeline observations to the `metrics` facade.
#[derive(Debug, Default)]
pub struct PrometheusRecorder;

impl MatchMetrics for PrometheusRecorder {
    fn record_match(&self, latency: Duration, candidates: usize, scored: usize, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        metrics::counter!("faqbot_match_total", "outcome" => outcome).increment(1);
        metrics::histogram!("faqbot_match_latency_seconds").record(latency.as_secs_f64());
        metrics::histogram!("faqbot_match_candidates").record(candidates as f64);
        metrics::counter!("faqbot_match_prefiltered_total")
            .increment(candidates.saturating_sub(scored) as u64);
    }
}

impl PipelineMetrics for PrometheusRecorder {
    fn record_answer(&self, source: AnswerSource, latency: Duration) {
        metrics::counter!("faqbot_answers_total", "source" => source.as_str()).increment(1);
        metrics::histogram!("faqbot_answer_latency_seconds", "source" => source.as_str())
            .record(latency.as_secs_f64());
    }

    fn record_llm(&self, provider: &str, latency: Duration, result: Result<(), &LlmError>) {
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            "faqbot_llm_requests_total",
            "provider" => provider.to_string(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!("faqbot_llm_latency_seconds", "provider" => provider.to_string())
            .record(latency.as_secs_f64());
    }
}

/// Install the Prometheus recorder and hook it into the matcher and pipeline.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let recorder = Arc::new(PrometheusRecorder);
    matcher::set_match_metrics(Some(recorder.clone()));
    faqbot::set_pipeline_metrics(Some(recorder));

    Ok(handle)
}
