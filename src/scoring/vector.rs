//! Term-frequency cosine similarity scorer.

use super::comparison::{ComparisonPlan, TokenTable};
use super::SimilarityScorer;
use std::collections::{BTreeMap, HashMap};

/// Scores each subject by the cosine similarity of raw term-count vectors.
///
/// Vectors are indexed by a vocabulary shared by every text in the plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorScorer;

impl SimilarityScorer for VectorScorer {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn score(&self, table: &TokenTable, plan: &ComparisonPlan) -> Vec<f64> {
        let members = plan.members();

        let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
        for &id in &members {
            for token in table.tokens(id) {
                vocabulary.insert(token.as_str(), 0);
            }
        }
        for (index, slot) in vocabulary.values_mut().enumerate() {
            *slot = index;
        }

        let vectors: HashMap<usize, Vec<f64>> = members
            .iter()
            .map(|&id| (id, term_frequencies(table.tokens(id), &vocabulary)))
            .collect();

        plan.comparisons()
            .iter()
            .map(|comparison| {
                comparison.average(|subject, comparand| {
                    cosine_similarity(&vectors[&subject], &vectors[&comparand])
                })
            })
            .collect()
    }
}

/// Count each vocabulary word's occurrences in `tokens`.
fn term_frequencies(tokens: &[String], vocabulary: &BTreeMap<&str, usize>) -> Vec<f64> {
    let mut vector = vec![0.0; vocabulary.len()];
    for token in tokens {
        if let Some(&index) = vocabulary.get(token.as_str()) {
            vector[index] += 1.0;
        }
    }
    vector
}

/// Cosine similarity of two equal-length vectors, scaled to `[0, 100]`.
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_b: f64 = b.iter().map(|x| x * x).sum();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // sqrt(|a|² · |b|²) keeps identical count vectors at exactly 100
    let similarity = dot / (norm_a * norm_b).sqrt() * 100.0;
    similarity.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairwise_scores(texts: &[&str]) -> Vec<f64> {
        let mut table = TokenTable::new();
        let subjects: Vec<usize> = texts.iter().map(|t| table.intern(t)).collect();
        let plan = ComparisonPlan::pairwise(&table, &subjects);
        VectorScorer.score(&table, &plan)
    }

    fn reference_scores(original: &str, texts: &[&str]) -> Vec<f64> {
        let mut table = TokenTable::new();
        let reference = table.intern(original);
        let subjects: Vec<usize> = texts.iter().map(|t| table.intern(t)).collect();
        let plan = ComparisonPlan::against_reference(&table, &subjects, reference);
        VectorScorer.score(&table, &plan)
    }

    // ==================== Cosine Tests ====================

    #[test]
    fn test_cosine_identical_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]), 100.0);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_magnitude() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = [2.0, 1.0, 0.0, 3.0];
        let b = [1.0, 0.0, 4.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_counts_repetition() {
        // [2, 1] vs [1, 1]: 3 / (sqrt(5) * sqrt(2))
        let expected = 3.0 / 10.0_f64.sqrt() * 100.0;
        assert!((cosine_similarity(&[2.0, 1.0], &[1.0, 1.0]) - expected).abs() < 1e-9);
    }

    // ==================== Scorer Tests ====================

    #[test]
    fn test_pairwise_single_candidate_scores_100() {
        assert_eq!(pairwise_scores(&["lonely"]), vec![100.0]);
    }

    #[test]
    fn test_pairwise_identical_pair_scores_100() {
        assert_eq!(pairwise_scores(&["The cat sat.", "The cat sat."]), vec![100.0, 100.0]);
    }

    #[test]
    fn test_pairwise_outlier_scores_lower() {
        let scores = pairwise_scores(&["The cat sat.", "The cat sat.", "A dog ran far away today."]);
        assert_eq!(scores[0], 50.0);
        assert_eq!(scores[1], 50.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_pairwise_empty_text_scores_zero() {
        assert_eq!(pairwise_scores(&["", "words here"]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_reference_uses_term_counts() {
        let scores = reference_scores("go go home", &["go home"]);
        // [2, 1] vs [1, 1]
        let expected = 3.0 / 10.0_f64.sqrt() * 100.0;
        assert!((scores[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reference_empty_original_scores_zero() {
        assert_eq!(reference_scores("", &["anything at all"]), vec![0.0]);
    }
}
