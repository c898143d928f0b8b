//! # faqbot Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides whether a tenant's existing FAQ answer is close enough to
//! an incoming chat message to be returned directly, so the serving layer can
//! skip the LLM call. It is a pure, synchronous library: the caller passes a
//! FAQ snapshot for one request and gets back at most one entry.
//!
//! ## Core Types
//!
//! - [`similarity`]: case-insensitive Levenshtein similarity in `[0, 1]`.
//! - [`FaqEntry`]: id + question + answer.
//! - [`MatchConfig`]: threshold (default [`DEFAULT_THRESHOLD`]) and the
//!   length prefilter switch.
//! - [`FaqMatcher`]: validated matcher; [`FaqMatcher::find_best_match`] keeps
//!   the first entry among equal best scores.
//! - [`contains_keywords`]: a cheap, loose keyword-overlap check.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{FaqEntry, FaqMatcher, MatchConfig};
//!
//! let faqs = vec![
//!     FaqEntry::new("1", "How do I reset my password?", "Go to settings > reset password."),
//!     FaqEntry::new("2", "What are your opening hours?", "9 to 5, Monday to Friday."),
//! ];
//!
//! let matcher = FaqMatcher::new(MatchConfig::default()).expect("valid config");
//! let hit = matcher
//!     .find_best_match("how can i reset my password", &faqs)
//!     .expect("close enough");
//! assert_eq!(hit.entry.id, "1");
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record per-call latency and hit/miss outcomes.

pub mod engine;
pub mod metrics;
pub mod similarity;
pub mod types;

pub use crate::engine::{contains_keywords, find_best_match, FaqMatcher};
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::similarity::{levenshtein, similarity, similarity_upper_bound};
pub use crate::types::{
    FaqEntry, MatchConfig, MatchError, MatchResult, ScoredEntry, DEFAULT_THRESHOLD,
};
