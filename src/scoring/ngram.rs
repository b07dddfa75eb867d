//! Bigram overlap and length-consistency scorer (the "semantic" score).
//!
//! This is a structural heuristic, not a measure of meaning: adjacent word
//! pairs are compared as sets, and the result is blended with a penalty for
//! token counts that drift away from the expected length.

use super::comparison::{jaccard_index, ComparisonPlan, TokenTable};
use super::SimilarityScorer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Tunable constants of the semantic score.
///
/// The defaults reproduce `0.7 × bigram + 0.3 × (100 − min(50, 5 × |Δlen|))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemanticWeights {
    /// Weight of the bigram overlap score
    pub bigram_weight: f64,

    /// Weight of the length-consistency score
    pub length_weight: f64,

    /// Points lost per token of length difference
    pub length_penalty_per_token: f64,

    /// Largest penalty the length term can apply
    pub max_length_penalty: f64,
}

impl Default for SemanticWeights {
    fn default() -> Self {
        Self {
            bigram_weight: 0.7,
            length_weight: 0.3,
            length_penalty_per_token: 5.0,
            max_length_penalty: 50.0,
        }
    }
}

impl SemanticWeights {
    /// Length-consistency score for a token count measured against a baseline.
    pub fn length_score(&self, length: f64, baseline: f64) -> f64 {
        let penalty = (self.length_penalty_per_token * (length - baseline).abs())
            .min(self.max_length_penalty);
        100.0 - penalty
    }

    /// Blend a bigram score and a length score.
    pub fn combine(&self, bigram_score: f64, length_score: f64) -> f64 {
        self.bigram_weight * bigram_score + self.length_weight * length_score
    }
}

/// Scores each subject by bigram overlap blended with length consistency.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgramScorer {
    weights: SemanticWeights,
}

impl NgramScorer {
    pub fn new(weights: SemanticWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &SemanticWeights {
        &self.weights
    }
}

impl SimilarityScorer for NgramScorer {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn score(&self, table: &TokenTable, plan: &ComparisonPlan) -> Vec<f64> {
        let bigram_sets: HashMap<usize, HashSet<(&str, &str)>> = plan
            .members()
            .into_iter()
            .map(|id| (id, bigrams(table.tokens(id))))
            .collect();

        plan.comparisons()
            .iter()
            .map(|comparison| {
                let bigram_score = comparison.average(|subject, comparand| {
                    jaccard_index(&bigram_sets[&subject], &bigram_sets[&comparand])
                });
                let length = table.tokens(comparison.subject).len() as f64;
                let length_score = self
                    .weights
                    .length_score(length, comparison.length_baseline);

                self.weights.combine(bigram_score, length_score)
            })
            .collect()
    }
}

/// Set of adjacent token pairs.
fn bigrams(tokens: &[String]) -> HashSet<(&str, &str)> {
    tokens
        .windows(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect()
}
