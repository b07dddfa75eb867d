//! The comparator shared by every scorer.
//!
//! Pairwise and reference evaluations differ only in *what* each text is
//! compared against. A [`ComparisonPlan`] captures that once, as a list of
//! `(subject, comparands, length baseline)` entries over a [`TokenTable`], and
//! each scorer walks the same plan with its own similarity metric.

use super::tokenizer::tokenize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// Score given to a subject that has nothing to be compared against.
pub const VACUOUS_AGREEMENT: f64 = 100.0;

/// Tokenized texts for one aggregation, memoized by exact text.
#[derive(Debug, Default)]
pub struct TokenTable {
    tokens: Vec<Vec<String>>,
    ids: HashMap<String, usize>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `text`, tokenizing it only the first time it is seen.
    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }

        let id = self.tokens.len();
        self.tokens.push(tokenize(text));
        self.ids.insert(text.to_string(), id);
        id
    }

    /// Tokens of a previously interned text.
    ///
    /// # Panics
    /// Panics if `id` was not returned by [`TokenTable::intern`] on this table.
    pub fn tokens(&self, id: usize) -> &[String] {
        &self.tokens[id]
    }

    /// Number of distinct texts tokenized so far.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One subject text and the texts it is scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Text id of the text being scored
    pub subject: usize,

    /// Text ids the subject is compared to (empty means "no comparand")
    pub comparands: Vec<usize>,

    /// Token count the subject's length is measured against
    pub length_baseline: f64,
}

impl Comparison {
    /// Average `similarity(subject, comparand)` over every comparand.
    ///
    /// A subject without comparands is in vacuous agreement and scores
    /// [`VACUOUS_AGREEMENT`].
    pub fn average<F>(&self, mut similarity: F) -> f64
    where
        F: FnMut(usize, usize) -> f64,
    {
        if self.comparands.is_empty() {
            return VACUOUS_AGREEMENT;
        }

        let total: f64 = self
            .comparands
            .iter()
            .map(|&comparand| similarity(self.subject, comparand))
            .sum();

        total / self.comparands.len() as f64
    }
}

/// The full set of comparisons for one aggregation, in subject order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonPlan {
    comparisons: Vec<Comparison>,
}

impl ComparisonPlan {
    /// Compare every subject to every *other* subject.
    ///
    /// Comparands are positional: two candidates with identical text still
    /// compare against each other. Lengths are measured against the mean token
    /// count of all subjects.
    pub fn pairwise(table: &TokenTable, subjects: &[usize]) -> Self {
        let length_baseline = if subjects.is_empty() {
            0.0
        } else {
            let total: usize = subjects.iter().map(|&id| table.tokens(id).len()).sum();
            total as f64 / subjects.len() as f64
        };

        let comparisons = subjects
            .iter()
            .enumerate()
            .map(|(position, &subject)| Comparison {
                subject,
                comparands: subjects
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != position)
                    .map(|(_, &id)| id)
                    .collect(),
                length_baseline,
            })
            .collect();

        Self { comparisons }
    }

    /// Compare every subject independently to a single reference text.
    pub fn against_reference(table: &TokenTable, subjects: &[usize], reference: usize) -> Self {
        let length_baseline = table.tokens(reference).len() as f64;

        let comparisons = subjects
            .iter()
            .map(|&subject| Comparison {
                subject,
                comparands: vec![reference],
                length_baseline,
            })
            .collect();

        Self { comparisons }
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Every text id that takes part in the plan, as subject or comparand.
    pub fn members(&self) -> BTreeSet<usize> {
        self.comparisons
            .iter()
            .flat_map(|c| std::iter::once(c.subject).chain(c.comparands.iter().copied()))
            .collect()
    }
}

/// Jaccard index of two sets, scaled to `[0, 100]`.
///
/// Two empty sets have an undefined similarity, which is scored as 0.
pub fn jaccard_index<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&'static str]) -> HashSet<&'static str> {
        items.iter().copied().collect()
    }

    // ==================== TokenTable Tests ====================

    #[test]
    fn test_intern_memoizes_identical_text() {
        let mut table = TokenTable::new();
        let first = table.intern("The cat sat.");
        let second = table.intern("The cat sat.");

        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
        assert_eq!(table.tokens(first), &["the", "cat", "sat"]);
    }

    #[test]
    fn test_intern_distinguishes_raw_text() {
        let mut table = TokenTable::new();
        let first = table.intern("The cat sat.");
        let second = table.intern("the cat sat");

        // Memoization is by raw text; tokens may still coincide
        assert_ne!(first, second);
        assert_eq!(table.tokens(first), table.tokens(second));
    }

    // ==================== ComparisonPlan Tests ====================

    #[test]
    fn test_pairwise_excludes_self_by_position() {
        let mut table = TokenTable::new();
        let a = table.intern("one two");
        let b = table.intern("one two");
        let c = table.intern("three");

        let plan = ComparisonPlan::pairwise(&table, &[a, b, c]);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.comparisons()[0].comparands, vec![b, c]);
        assert_eq!(plan.comparisons()[2].comparands, vec![a, b]);
    }

    #[test]
    fn test_pairwise_length_baseline_is_mean() {
        let mut table = TokenTable::new();
        let a = table.intern("one two three four");
        let b = table.intern("one two");

        let plan = ComparisonPlan::pairwise(&table, &[a, b]);

        assert_eq!(plan.comparisons()[0].length_baseline, 3.0);
        assert_eq!(plan.comparisons()[1].length_baseline, 3.0);
    }

    #[test]
    fn test_pairwise_single_subject_has_no_comparands() {
        let mut table = TokenTable::new();
        let a = table.intern("alone here");

        let plan = ComparisonPlan::pairwise(&table, &[a]);

        assert!(plan.comparisons()[0].comparands.is_empty());
        assert_eq!(plan.comparisons()[0].average(|_, _| 0.0), VACUOUS_AGREEMENT);
    }

    #[test]
    fn test_against_reference_uses_reference_length() {
        let mut table = TokenTable::new();
        let reference = table.intern("a b c d e");
        let a = table.intern("a b");

        let plan = ComparisonPlan::against_reference(&table, &[a], reference);

        assert_eq!(plan.comparisons()[0].comparands, vec![reference]);
        assert_eq!(plan.comparisons()[0].length_baseline, 5.0);
        assert_eq!(plan.members().into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_average_over_comparands() {
        let comparison = Comparison {
            subject: 0,
            comparands: vec![1, 2],
            length_baseline: 0.0,
        };

        let average = comparison.average(|_, other| if other == 1 { 100.0 } else { 50.0 });
        assert_eq!(average, 75.0);
    }

    #[test]
    fn test_empty_plan() {
        let table = TokenTable::new();
        let plan = ComparisonPlan::pairwise(&table, &[]);
        assert!(plan.is_empty());
        assert!(plan.members().is_empty());
    }

    // ==================== Jaccard Tests ====================

    #[test]
    fn test_jaccard_identical_sets() {
        assert_eq!(jaccard_index(&set(&["a", "b"]), &set(&["a", "b"])), 100.0);
    }

    #[test]
    fn test_jaccard_disjoint_sets() {
        assert_eq!(jaccard_index(&set(&["a"]), &set(&["b"])), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        // |{b}| / |{a, b, c}|
        let score = jaccard_index(&set(&["a", "b"]), &set(&["b", "c"]));
        assert!((score - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_both_empty_is_zero() {
        assert_eq!(jaccard_index(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_jaccard_one_empty_is_zero() {
        assert_eq!(jaccard_index(&set(&[]), &set(&["a"])), 0.0);
    }
}
