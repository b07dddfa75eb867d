//! Translation-quality scoring engine.
//!
//! Given a set of candidate translations (or their back-translations), three
//! independent heuristics score each candidate and the [`Aggregator`] averages
//! them into a ranking.
//!
//! # Architecture
//!
//! - `tokenizer`: Lowercase word tokenization shared by every scorer
//! - `comparison`: Which texts are compared to which (pairwise or against a reference)
//! - `lexical`: Jaccard overlap of word sets
//! - `vector`: Cosine similarity of term-frequency vectors
//! - `ngram`: Bigram overlap blended with length consistency
//! - `aggregate`: Runs all scorers, averages, and ranks
//!
//! # Example
//!
//! ```rust,ignore
//! use translation_evaluator::scoring::{Aggregator, ComparisonMode};
//!
//! let ranked = Aggregator::default().aggregate(&candidates, ComparisonMode::Pairwise);
//! for entry in ranked.iter() {
//!     println!("#{} {} {:.1}", entry.rank + 1, entry.scores.display_name, entry.scores.overall);
//! }
//! ```

mod aggregate;
mod comparison;
mod lexical;
mod ngram;
mod tokenizer;
mod vector;

pub use aggregate::{Aggregator, ComparisonMode, RankTier, RankedResult, RankedScore, ScoreSet};
pub use comparison::{jaccard_index, Comparison, ComparisonPlan, TokenTable, VACUOUS_AGREEMENT};
pub use lexical::LexicalScorer;
pub use ngram::{NgramScorer, SemanticWeights};
pub use tokenizer::tokenize;
pub use vector::{cosine_similarity, VectorScorer};

/// A similarity metric evaluated over a [`ComparisonPlan`].
pub trait SimilarityScorer {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// One score in `[0, 100]` per comparison, in plan order.
    fn score(&self, table: &TokenTable, plan: &ComparisonPlan) -> Vec<f64>;
}
