//! Property tests for index weights and ranking.
//!
//! Verifies:
//! 1. Every stored weight and magnitude is non-negative, magnitude = sqrt(Σw²)
//! 2. Scores lie in (0, 1] and come back sorted with id tie-break
//! 3. Builds are deterministic

use cpsearch_core::{IndexConfig, Problem, TfIdfIndex};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Words from a small vocabulary so documents overlap.
fn word_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "array", "graph", "tree", "binary", "search", "sum", "path", "string", "matrix", "sort",
        "prime", "queue", "stack", "interval", "the", "of", "dynamic", "greedy",
    ])
    .prop_map(str::to_string)
}

fn text_strategy(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 0..max).prop_map(|words| words.join(" "))
}

fn problem_strategy() -> impl Strategy<Value = Problem> {
    (text_strategy(4), prop::option::of(text_strategy(12)), any::<bool>()).prop_map(|(title, description, lc)| {
        let url = if lc { "https://leetcode.com/problems/p/" } else { "https://codeforces.com/problemset/problem/1/A" };
        Problem::new(title, description.as_deref(), url)
    })
}

fn corpus_strategy() -> impl Strategy<Value = Vec<Problem>> {
    prop::collection::vec(problem_strategy(), 1..25)
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn weights_and_magnitudes_are_consistent(corpus in corpus_strategy()) {
        let index = TfIdfIndex::build(corpus, &IndexConfig::default());
        for doc in index.documents() {
            let vector = index.vector(doc.id).unwrap();
            let magnitude = index.magnitude(doc.id).unwrap();
            prop_assert!(magnitude >= 0.0);
            let mut sum_sq = 0.0f32;
            for (_, w) in vector.iter() {
                prop_assert!(w >= 0.0);
                sum_sq += w * w;
            }
            prop_assert!((magnitude - sum_sq.sqrt()).abs() <= 1e-5);
        }
    }

    #[test]
    fn scores_are_bounded_and_sorted(corpus in corpus_strategy(), query in text_strategy(5), top_k in 0usize..15) {
        let index = TfIdfIndex::build(corpus, &IndexConfig::default());
        if let Ok(hits) = index.search(&query, top_k) {
            prop_assert!(hits.len() <= top_k);
            for hit in &hits {
                prop_assert!(hit.score > 0.0 && hit.score <= 1.0, "score {}", hit.score);
            }
            for pair in hits.windows(2) {
                prop_assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score && pair[0].doc_id < pair[1].doc_id)
                );
            }
        }
    }

    #[test]
    fn builds_are_deterministic(corpus in corpus_strategy()) {
        let a = TfIdfIndex::build(corpus.clone(), &IndexConfig::default());
        let b = TfIdfIndex::build(corpus, &IndexConfig::default());
        prop_assert_eq!(a.terms(), b.terms());
        prop_assert_eq!(a.doc_frequencies(), b.doc_frequencies());
        for doc in a.documents() {
            prop_assert_eq!(a.vector(doc.id), b.vector(doc.id));
            prop_assert_eq!(a.magnitude(doc.id), b.magnitude(doc.id));
        }
    }
}
