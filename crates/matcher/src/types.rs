use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum similarity for a FAQ answer to be returned directly.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// A single question/answer pair from a tenant's knowledge base.
///
/// Entries are read-only to the matcher; it borrows them for the duration of
/// one query and never reorders or edits the slice it is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaqEntry {
    /// Opaque identifier assigned by the store.
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The winning entry for a query together with its similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult<'a> {
    pub entry: &'a FaqEntry,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

/// Per-entry score, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    pub id: String,
    /// `None` when the length prefilter skipped the pair.
    pub score: Option<f64>,
}

/// Matcher configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Minimum similarity (inclusive) for an entry to be returned.
    #[serde(default = "MatchConfig::default_threshold")]
    pub threshold: f64,
    /// Skip entries whose length ratio alone rules out reaching `threshold`.
    /// Reported scores are unaffected.
    #[serde(default = "MatchConfig::default_length_prefilter")]
    pub length_prefilter: bool,
}

impl MatchConfig {
    pub(crate) fn default_threshold() -> f64 {
        DEFAULT_THRESHOLD
    }

    pub(crate) fn default_length_prefilter() -> bool {
        true
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Reject thresholds outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> Result<(), MatchError> {
        validate_threshold(self.threshold)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            length_prefilter: Self::default_length_prefilter(),
        }
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<(), MatchError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(MatchError::InvalidConfig(format!(
            "threshold must be between 0.0 and 1.0, got {threshold}"
        )));
    }
    Ok(())
}

/// Errors produced by the matching layer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    /// Invalid matcher configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
}
