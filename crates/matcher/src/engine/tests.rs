use super::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::metrics::{set_match_metrics, MatchMetrics};
use crate::similarity::similarity;
use crate::types::DEFAULT_THRESHOLD;

fn faq(id: &str, question: &str) -> FaqEntry {
    FaqEntry::new(id, question, format!("answer-{id}"))
}

fn default_matcher() -> FaqMatcher {
    FaqMatcher::new(MatchConfig::default()).expect("default config is valid")
}

#[test]
fn empty_faq_list_never_matches() {
    let matcher = default_matcher();
    assert!(matcher.find_best_match("anything", &[]).is_none());
    assert!(matcher.find_best_match("", &[]).is_none());
}

#[test]
fn refund_beats_return_for_refund_query() {
    let faqs = vec![
        faq("refund", "What is your refund policy?"),
        faq("return", "What is your return policy?"),
    ];

    let hit = default_matcher()
        .find_best_match("whats your refund policy", &faqs)
        .expect("refund question should match");

    assert_eq!(hit.entry.id, "refund");
    assert!(hit.score >= DEFAULT_THRESHOLD);
}

#[test]
fn refund_wins_regardless_of_order() {
    let faqs = vec![
        faq("return", "What is your return policy?"),
        faq("refund", "What is your refund policy?"),
    ];

    let hit = default_matcher()
        .find_best_match("whats your refund policy", &faqs)
        .expect("match");
    assert_eq!(hit.entry.id, "refund");
}

#[test]
fn duplicate_questions_keep_first_entry() {
    let faqs = vec![
        faq("A", "Do you ship internationally?"),
        faq("B", "Do you ship internationally?"),
    ];

    let hit = default_matcher()
        .find_best_match("Do you ship internationally?", &faqs)
        .expect("match");

    assert_eq!(hit.entry.id, "A");
    assert_eq!(hit.score, 1.0);
}

#[test]
fn equal_scores_keep_first_entry() {
    // Both questions are one substitution away from the query.
    let faqs = vec![faq("first", "abcx"), faq("second", "abcy")];

    let hit = default_matcher().find_best_match("abcd", &faqs).expect("match");
    assert_eq!(hit.entry.id, "first");
    assert_eq!(hit.score, 0.75);
}

#[test]
fn below_threshold_only_candidate_is_rejected() {
    // 9 substitutions over 20 chars: score 0.55
    let query = "aaaaaaaaaaaaaaaaaaaa";
    let faqs = vec![faq("only", "aaaaaaaaaaabbbbbbbbb")];

    let scores = default_matcher().score_all(query, &faqs);
    let score = scores[0].score.expect("pair is within length bound");
    assert!((score - 0.55).abs() < 1e-9);

    assert!(default_matcher().find_best_match(query, &faqs).is_none());
}

#[test]
fn score_equal_to_threshold_passes() {
    // 4 substitutions over 16 chars: exactly 0.75
    let query = "aaaaaaaaaaaaaaaa";
    let faqs = vec![faq("edge", "aaaaaaaaaaaabbbb")];

    let matcher = FaqMatcher::new(MatchConfig::with_threshold(0.75)).expect("valid");
    let hit = matcher.find_best_match(query, &faqs).expect("match at threshold");
    assert_eq!(hit.score, 0.75);

    let stricter = FaqMatcher::new(MatchConfig::with_threshold(0.76)).expect("valid");
    assert!(stricter.find_best_match(query, &faqs).is_none());
}

#[test]
fn later_higher_score_replaces_earlier_best() {
    let faqs = vec![
        faq("weak", "How do I change my email?"),
        faq("strong", "How do I change my password?"),
    ];

    let hit = default_matcher()
        .find_best_match("how do i change my password", &faqs)
        .expect("match");
    assert_eq!(hit.entry.id, "strong");
}

#[test]
fn reset_password_scenario() {
    let faqs = vec![FaqEntry::new(
        "1",
        "How do I reset my password?",
        "Go to settings > reset password.",
    )];

    let hit = default_matcher()
        .find_best_match("how can i reset my password", &faqs)
        .expect("match");

    assert_eq!(hit.entry.id, "1");
    assert!(hit.score >= 0.6);
    assert_eq!(hit.entry.answer, "Go to settings > reset password.");
}

#[test]
fn unrelated_query_falls_through() {
    let faqs = vec![
        faq("1", "How do I reset my password?"),
        faq("2", "What are your opening hours?"),
    ];
    assert!(default_matcher()
        .find_best_match("Can I pay with bitcoin at the counter", &faqs)
        .is_none());
}

#[test]
fn zero_threshold_still_requires_positive_score() {
    let faqs = vec![faq("x", "zzz")];
    let matcher = FaqMatcher::new(MatchConfig::with_threshold(0.0)).expect("valid");
    assert!(matcher.find_best_match("aaa", &faqs).is_none());

    let faqs = vec![faq("x", "zza")];
    let hit = matcher.find_best_match("aaa", &faqs).expect("match");
    assert!(hit.score > 0.0);
}

#[test]
fn empty_query_matches_empty_question() {
    let faqs = vec![faq("blank", ""), faq("full", "hello")];
    let hit = default_matcher().find_best_match("", &faqs).expect("match");
    assert_eq!(hit.entry.id, "blank");
    assert_eq!(hit.score, 1.0);
}

#[test]
fn prefilter_does_not_change_outcome() {
    let faqs = vec![
        faq("1", "What is your refund policy?"),
        faq("2", "Refunds?"),
        faq("3", "Can I get a refund on a sale item purchased more than thirty days ago?"),
        faq("4", "what is your refund policy"),
        faq("5", ""),
    ];
    let queries = [
        "whats your refund policy",
        "refund",
        "",
        "WHAT IS YOUR REFUND POLICY?",
        "can i get a refund on sale items",
    ];

    for threshold in [0.0, 0.3, 0.6, 0.9, 1.0] {
        let with = FaqMatcher::new(MatchConfig {
            threshold,
            length_prefilter: true,
        })
        .expect("valid");
        let without = FaqMatcher::new(MatchConfig {
            threshold,
            length_prefilter: false,
        })
        .expect("valid");

        for query in queries {
            let a = with.find_best_match(query, &faqs);
            let b = without.find_best_match(query, &faqs);
            assert_eq!(
                a.map(|m| (m.entry.id.clone(), m.score)),
                b.map(|m| (m.entry.id.clone(), m.score)),
                "query {query:?} at threshold {threshold}"
            );
        }
    }
}

fn with_and_without_prefilter(threshold: f64) -> (FaqMatcher, FaqMatcher) {
    let with = FaqMatcher::new(MatchConfig {
        threshold,
        length_prefilter: true,
    })
    .expect("valid");
    let without = FaqMatcher::new(MatchConfig {
        threshold,
        length_prefilter: false,
    })
    .expect("valid");
    (with, without)
}

#[test]
fn prefilter_keeps_entry_scoring_exactly_threshold() {
    // pure length difference: the score equals the length bound
    let threshold = similarity("ab", "abc");
    let faqs = vec![faq("1", "abc")];
    let (with, without) = with_and_without_prefilter(threshold);

    let hit = with.find_best_match("ab", &faqs).expect("score meets threshold");
    assert_eq!(hit.entry.id, "1");
    assert_eq!(hit.score, threshold);
    assert_eq!(
        without.find_best_match("ab", &faqs).map(|m| m.score),
        Some(threshold)
    );
    assert_eq!(with.score_all("ab", &faqs)[0].score, Some(threshold));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prefilter_equivalent_at_achievable_thresholds(
        a in "[a-c ]{0,12}",
        b in "[a-c ]{0,12}",
        others in proptest::collection::vec("[a-c ]{0,12}", 0..6),
    ) {
        let threshold = similarity(&a, &b);
        let mut faqs = vec![faq("pair", &b)];
        faqs.extend(
            others
                .iter()
                .enumerate()
                .map(|(i, q)| faq(&format!("other-{i}"), q)),
        );
        let (with, without) = with_and_without_prefilter(threshold);

        prop_assert_eq!(
            with.find_best_match(&a, &faqs).map(|m| (m.entry.id.clone(), m.score)),
            without.find_best_match(&a, &faqs).map(|m| (m.entry.id.clone(), m.score))
        );
    }
}

#[test]
fn score_all_reports_skipped_pairs() {
    let faqs = vec![faq("short", "hi"), faq("long", "hello there friend")];
    let scores = default_matcher().score_all("hello there friend", &faqs);

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].id, "short");
    assert_eq!(scores[0].score, None);
    assert_eq!(scores[1].score, Some(1.0));

    let unfiltered = FaqMatcher::new(MatchConfig {
        threshold: 0.6,
        length_prefilter: false,
    })
    .expect("valid");
    let scores = unfiltered.score_all("hello there friend", &faqs);
    assert!(scores.iter().all(|s| s.score.is_some()));
}

#[test]
fn faq_list_is_not_mutated() {
    let faqs = vec![
        faq("b", "Where are you located?"),
        faq("a", "Where are you located"),
    ];
    let before = faqs.clone();
    let _ = default_matcher().find_best_match("where are you located", &faqs);
    assert_eq!(faqs, before);
}

#[test]
fn invalid_threshold_is_rejected() {
    let faqs = vec![faq("1", "hello")];
    for bad in [-0.01, 1.5, f64::NAN] {
        assert!(matches!(
            find_best_match("hello", &faqs, bad),
            Err(MatchError::InvalidConfig(_))
        ));
        assert!(FaqMatcher::new(MatchConfig::with_threshold(bad)).is_err());
    }
}

#[test]
fn free_function_uses_given_threshold() {
    let faqs = vec![faq("1", "aaaaaaaaaaabbbbbbbbb")];
    let query = "aaaaaaaaaaaaaaaaaaaa";

    assert!(find_best_match(query, &faqs, 0.6).expect("valid").is_none());
    let hit = find_best_match(query, &faqs, 0.5)
        .expect("valid")
        .expect("match");
    assert_eq!(hit.entry.id, "1");
}

#[test]
fn contains_keywords_half_of_faq_words() {
    let entry = faq("1", "How do I reset my password?");
    // how, reset, password? match; do, i, my do not: 3/6
    assert!(contains_keywords("how reset password", &entry));
    assert!(!contains_keywords("reset", &entry));
}

#[test]
fn contains_keywords_is_bidirectional_substring() {
    let entry = faq("1", "refunds available");
    // "refund" is inside "refunds"
    assert!(contains_keywords("refund", &entry));

    let entry = faq("2", "ship");
    // "ship" is inside "shipping"
    assert!(contains_keywords("shipping", &entry));
}

#[test]
fn contains_keywords_single_letter_is_loose() {
    let entry = faq("1", "cat dog");
    assert!(contains_keywords("a", &entry));
}

#[test]
fn contains_keywords_is_case_insensitive() {
    let entry = faq("1", "Opening Hours");
    assert!(contains_keywords("OPENING hours today", &entry));
}

#[test]
fn contains_keywords_empty_cases() {
    assert!(!contains_keywords("anything", &faq("1", "")));
    assert!(!contains_keywords("anything", &faq("1", "   ")));
    assert!(!contains_keywords("", &faq("1", "refund policy")));
    assert!(!contains_keywords("shipping times", &faq("1", "refund policy")));
}

#[test]
fn contains_keywords_surrounding_whitespace_adds_no_tokens() {
    // an empty token would be a substring of every word
    assert!(!contains_keywords("  shipping times  ", &faq("1", "refund policy")));
    assert!(!contains_keywords("shipping", &faq("1", " refund policy ")));
    assert!(contains_keywords(" refund ", &faq("1", "\trefund policy\n")));
}

#[derive(Default)]
struct CountingMetrics {
    calls: AtomicUsize,
    hits: AtomicUsize,
}

impl MatchMetrics for CountingMetrics {
    fn record_match(&self, _latency: Duration, candidates: usize, scored: usize, hit: bool) {
        assert!(scored <= candidates);
        self.calls.fetch_add(1, Ordering::SeqCst);
        if hit {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn metrics_recorder_observes_matches() {
    let recorder = Arc::new(CountingMetrics::default());
    set_match_metrics(Some(recorder.clone()));

    let faqs = vec![faq("1", "hello")];
    let matcher = default_matcher();
    let _ = matcher.find_best_match("hello", &faqs);
    let _ = matcher.find_best_match("something else entirely", &faqs);

    set_match_metrics(None);

    // Other tests may run concurrently while the recorder is installed.
    assert!(recorder.calls.load(Ordering::SeqCst) >= 2);
    assert!(recorder.hits.load(Ordering::SeqCst) >= 1);
}
