//! Runs every scorer over a candidate set and ranks the results.

use super::comparison::{ComparisonPlan, TokenTable};
use super::lexical::LexicalScorer;
use super::ngram::{NgramScorer, SemanticWeights};
use super::vector::VectorScorer;
use super::SimilarityScorer;
use crate::candidate::{Candidate, ReferenceBundle};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What each candidate is compared against.
#[derive(Debug, Clone, Copy)]
pub enum ComparisonMode<'a> {
    /// Candidates are compared to each other.
    Pairwise,
    /// Each candidate's back-translation is compared to the original text.
    Reference(&'a ReferenceBundle),
}

/// Scores of one candidate, each in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSet {
    pub candidate_key: String,
    pub display_name: String,
    pub lexical: f64,
    pub vector: f64,
    pub semantic: f64,
    /// Arithmetic mean of the three component scores
    pub overall: f64,
}

impl ScoreSet {
    pub fn new(
        candidate_key: impl Into<String>,
        display_name: impl Into<String>,
        lexical: f64,
        vector: f64,
        semantic: f64,
    ) -> Self {
        Self {
            candidate_key: candidate_key.into(),
            display_name: display_name.into(),
            lexical,
            vector,
            semantic,
            overall: (lexical + vector + semantic) / 3.0,
        }
    }
}

/// Display tier of a rank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankTier {
    First,
    Second,
    Third,
    Unranked,
}

impl RankTier {
    /// Tier for a 0-based rank.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => RankTier::First,
            1 => RankTier::Second,
            2 => RankTier::Third,
            _ => RankTier::Unranked,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankTier::First => "1st",
            RankTier::Second => "2nd",
            RankTier::Third => "3rd",
            RankTier::Unranked => "-",
        }
    }
}

/// A candidate's scores together with its position in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedScore {
    pub rank: usize,
    pub tier: RankTier,
    pub scores: ScoreSet,
}

/// Score sets ordered by descending `overall`, ties kept in input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedResult {
    entries: Vec<RankedScore>,
}

impl RankedResult {
    /// Rank score sets. The sort is stable, so exact ties keep their input order.
    pub fn from_scores(mut scores: Vec<ScoreSet>) -> Self {
        scores.sort_by(|a, b| b.overall.total_cmp(&a.overall));

        let entries = scores
            .into_iter()
            .enumerate()
            .map(|(rank, scores)| RankedScore {
                rank,
                tier: RankTier::from_rank(rank),
                scores,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[RankedScore] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedScore> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best-scoring candidate, if any.
    pub fn top(&self) -> Option<&RankedScore> {
        self.entries.first()
    }

    pub fn get(&self, candidate_key: &str) -> Option<&RankedScore> {
        self.entries
            .iter()
            .find(|entry| entry.scores.candidate_key == candidate_key)
    }
}

/// Runs the lexical, vector and semantic scorers and ranks candidates.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    lexical: LexicalScorer,
    vector: VectorScorer,
    semantic: NgramScorer,
}

impl Aggregator {
    pub fn new(weights: SemanticWeights) -> Self {
        Self {
            lexical: LexicalScorer,
            vector: VectorScorer,
            semantic: NgramScorer::new(weights),
        }
    }

    /// Score and rank `candidates`.
    ///
    /// Failed candidates are skipped, and in reference mode so are candidates
    /// without a resolved back-translation. With nothing left to score the
    /// result is empty.
    pub fn aggregate(&self, candidates: &[Candidate], mode: ComparisonMode<'_>) -> RankedResult {
        let subjects: Vec<(&Candidate, &str)> = candidates
            .iter()
            .filter_map(|candidate| {
                let text = match mode {
                    ComparisonMode::Pairwise => candidate.scorable_text(),
                    ComparisonMode::Reference(bundle) => {
                        candidate.scorable_text()?;
                        bundle.back_translation(&candidate.key)
                    }
                };
                text.map(|text| (candidate, text))
            })
            .collect();

        if subjects.is_empty() {
            debug!(
                "No scorable candidates out of {}, returning empty ranking",
                candidates.len()
            );
            return RankedResult::default();
        }

        let mut table = TokenTable::new();
        let subject_ids: Vec<usize> = subjects.iter().map(|(_, text)| table.intern(text)).collect();

        let plan = match mode {
            ComparisonMode::Pairwise => ComparisonPlan::pairwise(&table, &subject_ids),
            ComparisonMode::Reference(bundle) => {
                let reference = table.intern(&bundle.original_text);
                ComparisonPlan::against_reference(&table, &subject_ids, reference)
            }
        };

        let lexical = self.lexical.score(&table, &plan);
        let vector = self.vector.score(&table, &plan);
        let semantic = self.semantic.score(&table, &plan);

        debug!(
            "Scored {} candidates over {} distinct texts",
            subjects.len(),
            table.len()
        );

        let scores = subjects
            .iter()
            .enumerate()
            .map(|(i, (candidate, _))| {
                ScoreSet::new(
                    candidate.key.clone(),
                    candidate.display_name.clone(),
                    lexical[i],
                    vector[i],
                    semantic[i],
                )
            })
            .collect();

        RankedResult::from_scores(scores)
    }
}
