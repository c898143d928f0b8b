use std::time::Instant;

use crate::metrics::metrics_recorder;
use crate::similarity::{fold, similarity_chars, similarity_upper_bound};
use crate::types::{validate_threshold, FaqEntry, MatchConfig, MatchError, MatchResult, ScoredEntry};

#[cfg(test)]
mod tests;

/// Selects at most one FAQ entry as the answer to a query.
///
/// The matcher holds only a validated [`MatchConfig`]; FAQ lists are passed
/// per call, so one instance can be shared across tenants and threads.
#[derive(Debug, Clone, Copy)]
pub struct FaqMatcher {
    config: MatchConfig,
}

impl FaqMatcher {
    /// Build a matcher, rejecting thresholds outside `[0, 1]`.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Return the entry most similar to `query`, if it reaches the threshold.
    ///
    /// An entry only displaces the current best when its score is strictly
    /// greater, so among equal scores the earliest entry wins. Scores equal
    /// to the threshold pass.
    pub fn find_best_match<'a>(
        &self,
        query: &str,
        faqs: &'a [FaqEntry],
    ) -> Option<MatchResult<'a>> {
        if faqs.is_empty() {
            return None;
        }

        let start = Instant::now();
        let threshold = self.config.threshold;
        let query_chars = fold(query);

        let mut best: Option<MatchResult<'a>> = None;
        let mut best_score = 0.0;
        let mut scored = 0usize;

        for entry in faqs {
            let question_chars = fold(&entry.question);
            if self.config.length_prefilter
                && similarity_upper_bound(query_chars.len(), question_chars.len()) < threshold
            {
                continue;
            }

            scored += 1;
            let score = similarity_chars(&query_chars, &question_chars);
            tracing::trace!(faq_id = %entry.id, score, "scored faq entry");

            if score > best_score && score >= threshold {
                best_score = score;
                best = Some(MatchResult { entry, score });
            }
        }

        tracing::debug!(
            candidates = faqs.len(),
            scored,
            threshold,
            matched = best.map(|m| m.entry.id.as_str()),
            score = best.map(|m| m.score),
            "faq match complete"
        );

        if let Some(recorder) = metrics_recorder() {
            recorder.record_match(start.elapsed(), faqs.len(), scored, best.is_some());
        }

        best
    }

    /// Score every entry against `query` in list order.
    ///
    /// Entries the length prefilter would skip report `None`.
    pub fn score_all(&self, query: &str, faqs: &[FaqEntry]) -> Vec<ScoredEntry> {
        let query_chars = fold(query);
        faqs.iter()
            .map(|entry| {
                let question_chars = fold(&entry.question);
                let skip = self.config.length_prefilter
                    && similarity_upper_bound(query_chars.len(), question_chars.len())
                        < self.config.threshold;
                ScoredEntry {
                    id: entry.id.clone(),
                    score: (!skip).then(|| similarity_chars(&query_chars, &question_chars)),
                }
            })
            .collect()
    }
}

impl Default for FaqMatcher {
    fn default() -> Self {
        Self {
            config: MatchConfig::default(),
        }
    }
}

/// One-shot form of [`FaqMatcher::find_best_match`] with an explicit threshold.
pub fn find_best_match<'a>(
    query: &str,
    faqs: &'a [FaqEntry],
    threshold: f64,
) -> Result<Option<MatchResult<'a>>, MatchError> {
    validate_threshold(threshold)?;
    let matcher = FaqMatcher::new(MatchConfig::with_threshold(threshold))?;
    Ok(matcher.find_best_match(query, faqs))
}

/// Coarse keyword overlap check between a query and a FAQ question.
///
/// A FAQ word counts as matched when it contains, or is contained in, any
/// query word. Returns true when at least half of the FAQ words match. The
/// containment is deliberately loose: a one-letter word like "a" matches
/// almost anything. A question with no words never matches.
pub fn contains_keywords(query: &str, faq: &FaqEntry) -> bool {
    let query_lower = query.to_lowercase();
    let question_lower = faq.question.to_lowercase();
    let query_words: Vec<&str> = query_lower.split_whitespace().collect();
    let faq_words: Vec<&str> = question_lower.split_whitespace().collect();

    if faq_words.is_empty() {
        return false;
    }

    let matched = faq_words
        .iter()
        .filter(|word| {
            query_words
                .iter()
                .any(|q| q.contains(*word) || word.contains(*q))
        })
        .count();

    matched as f64 / faq_words.len() as f64 >= 0.5
}
