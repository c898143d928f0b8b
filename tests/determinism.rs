use faqbot::{find_best_match, similarity, FaqEntry, FaqMatcher, MatchConfig};

fn faqs() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new("a", "How do I cancel my order?", "Cancel from the orders page."),
        FaqEntry::new("b", "How do I cancel my order?", "Duplicate wording, later entry."),
        FaqEntry::new("c", "How do I change my order?", "Edit it within an hour."),
        FaqEntry::new("d", "Where is my order?", "Check the tracking link."),
    ]
}

#[test]
fn repeated_queries_return_the_same_entry_and_score() {
    let matcher = FaqMatcher::default();
    let faqs = faqs();

    let first = matcher
        .find_best_match("how do i cancel my order", &faqs)
        .expect("match");
    for _ in 0..50 {
        let again = matcher
            .find_best_match("how do i cancel my order", &faqs)
            .expect("match");
        assert_eq!(again.entry.id, first.entry.id);
        assert_eq!(again.score.to_bits(), first.score.to_bits());
    }
    // earliest of the tied duplicates
    assert_eq!(first.entry.id, "a");
}

#[test]
fn case_and_prefilter_do_not_change_the_outcome() {
    let faqs = faqs();
    let with_prefilter = FaqMatcher::default();
    let without_prefilter = FaqMatcher::new(MatchConfig {
        length_prefilter: false,
        ..MatchConfig::default()
    })
    .expect("valid config");

    for query in [
        "HOW DO I CANCEL MY ORDER?",
        "how do i change my order",
        "where's my order",
        "completely unrelated question about the weather",
    ] {
        let a = with_prefilter.find_best_match(query, &faqs);
        let b = without_prefilter.find_best_match(query, &faqs);
        assert_eq!(a.map(|m| m.entry.id.clone()), b.map(|m| m.entry.id.clone()), "{query}");
        assert_eq!(a.map(|m| m.score), b.map(|m| m.score), "{query}");
    }
}

#[test]
fn prefilter_agrees_when_threshold_is_an_exact_score() {
    let faqs = faqs();
    let pairs = [
        ("Where is my order", "Where is my order?"),
        ("How do I cancel my order", "How do I cancel my order?"),
        ("ab", "abc"),
        ("abcde", "abcdefg"),
    ];

    for (query, question) in pairs {
        let threshold = similarity(query, question);
        let with_prefilter = FaqMatcher::new(MatchConfig::with_threshold(threshold)).expect("valid");
        let without_prefilter = FaqMatcher::new(MatchConfig {
            threshold,
            length_prefilter: false,
        })
        .expect("valid");

        let mut candidates = faqs.clone();
        candidates.push(FaqEntry::new("exact", question, "hit"));
        let a = with_prefilter.find_best_match(query, &candidates);
        let b = without_prefilter.find_best_match(query, &candidates);
        assert!(a.is_some(), "{query:?} should reach threshold {threshold}");
        assert_eq!(a.map(|m| (m.entry.id.clone(), m.score)), b.map(|m| (m.entry.id.clone(), m.score)));
    }
}

#[test]
fn free_function_agrees_with_matcher() {
    let faqs = faqs();
    let via_fn = find_best_match("where is my order", &faqs, 0.6)
        .expect("valid threshold")
        .expect("match");
    let via_matcher = FaqMatcher::default()
        .find_best_match("where is my order", &faqs)
        .expect("match");
    assert_eq!(via_fn, via_matcher);
    assert_eq!(via_fn.entry.id, "d");
}
