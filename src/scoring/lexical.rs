//! Word-set overlap (Jaccard) scorer.

use super::comparison::{jaccard_index, ComparisonPlan, TokenTable};
use super::SimilarityScorer;
use std::collections::{HashMap, HashSet};

/// Scores each subject by the Jaccard index of its word set against its comparands.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl SimilarityScorer for LexicalScorer {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn score(&self, table: &TokenTable, plan: &ComparisonPlan) -> Vec<f64> {
        let word_sets: HashMap<usize, HashSet<&str>> = plan
            .members()
            .into_iter()
            .map(|id| (id, table.tokens(id).iter().map(String::as_str).collect()))
            .collect();

        plan.comparisons()
            .iter()
            .map(|comparison| {
                comparison.average(|subject, comparand| {
                    jaccard_index(&word_sets[&subject], &word_sets[&comparand])
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairwise_scores(texts: &[&str]) -> Vec<f64> {
        let mut table = TokenTable::new();
        let subjects: Vec<usize> = texts.iter().map(|t| table.intern(t)).collect();
        let plan = ComparisonPlan::pairwise(&table, &subjects);
        LexicalScorer.score(&table, &plan)
    }

    fn reference_scores(original: &str, texts: &[&str]) -> Vec<f64> {
        let mut table = TokenTable::new();
        let reference = table.intern(original);
        let subjects: Vec<usize> = texts.iter().map(|t| table.intern(t)).collect();
        let plan = ComparisonPlan::against_reference(&table, &subjects, reference);
        LexicalScorer.score(&table, &plan)
    }

    // ==================== Pairwise Tests ====================

    #[test]
    fn test_pairwise_single_candidate_scores_100() {
        assert_eq!(pairwise_scores(&["Only one translation"]), vec![100.0]);
    }

    #[test]
    fn test_pairwise_identical_pair_scores_100() {
        assert_eq!(pairwise_scores(&["The cat sat.", "the cat sat"]), vec![100.0, 100.0]);
    }

    #[test]
    fn test_pairwise_averages_over_others() {
        let scores = pairwise_scores(&["The cat sat.", "The cat sat.", "A dog ran far away today."]);

        // Identical pair: (100 + 0) / 2; outlier: (0 + 0) / 2
        assert_eq!(scores, vec![50.0, 50.0, 0.0]);
    }

    #[test]
    fn test_pairwise_ignores_word_repetition() {
        assert_eq!(pairwise_scores(&["go go go", "go"]), vec![100.0, 100.0]);
    }

    #[test]
    fn test_pairwise_empty_text_scores_zero_against_non_empty() {
        let scores = pairwise_scores(&["", "some words"]);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_pairwise_two_empty_texts_score_zero() {
        assert_eq!(pairwise_scores(&["", "  "]), vec![0.0, 0.0]);
    }

    // ==================== Reference Tests ====================

    #[test]
    fn test_reference_scores_each_candidate_independently() {
        let scores = reference_scores(
            "the quick brown fox",
            &["the quick brown fox", "the slow brown dog", "nothing shared"],
        );

        assert_eq!(scores[0], 100.0);
        // {the, brown} / {the, quick, brown, fox, slow, dog}
        assert!((scores[1] - 2.0 / 6.0 * 100.0).abs() < 1e-9);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_reference_single_candidate_is_not_vacuous() {
        let scores = reference_scores("hello world", &["goodbye moon"]);
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn test_name() {
        assert_eq!(LexicalScorer.name(), "lexical");
    }
}
