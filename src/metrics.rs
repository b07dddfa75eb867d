//! Evaluation metrics: reference-cache effectiveness and collaborator health.
//!
//! Each [`crate::evaluation::Evaluator`] owns its own counters so concurrent
//! sessions (and tests) never see each other's numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for one evaluator.
#[derive(Debug, Default)]
pub struct EvaluationMetrics {
    /// Reference bundles found in the persisted cache
    cache_hits: AtomicUsize,

    /// Reference bundles that had to be fetched
    cache_misses: AtomicUsize,

    /// Calls made to the back-translation collaborator
    collaborator_calls: AtomicUsize,

    /// Collaborator calls that failed or returned malformed data
    collaborator_failures: AtomicUsize,

    /// Evaluations whose result was discarded because newer input arrived
    superseded: AtomicUsize,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collaborator_call(&self) {
        self.collaborator_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collaborator_failure(&self) {
        self.collaborator_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn collaborator_calls(&self) -> usize {
        self.collaborator_calls.load(Ordering::Relaxed)
    }

    pub fn collaborator_failures(&self) -> usize {
        self.collaborator_failures.load(Ordering::Relaxed)
    }

    pub fn superseded(&self) -> usize {
        self.superseded.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_lookups = hits + misses;
        let cache_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.collaborator_calls();
        let failures = self.collaborator_failures();
        let collaborator_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            collaborator_calls: calls,
            collaborator_failures: failures,
            collaborator_success_rate,
            superseded: self.superseded(),
        }
    }
}

/// Snapshot of [`EvaluationMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub collaborator_calls: usize,
    pub collaborator_failures: usize,

    /// Collaborator success rate as a percentage (0-100)
    pub collaborator_success_rate: f64,

    pub superseded: usize,
}
