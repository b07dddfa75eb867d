//! Runs one evaluation at a time per input: fetch (or reuse) the reference
//! bundle, score, and publish the ranking.
//!
//! Every call to [`Evaluator::evaluate`] takes a new generation number. Only
//! the newest generation may change the published status or the latest
//! result; older calls that finish late return [`EvaluationOutcome::Superseded`].

use super::cache::{fingerprint, ReferenceCache, ReferenceStore};
use super::collaborator::{BackTranslationRequest, BackTranslator};
use super::error::EvaluationError;
use crate::candidate::{Candidate, ReferenceBundle};
use crate::i18n::Language;
use crate::metrics::EvaluationMetrics;
use crate::scoring::{Aggregator, ComparisonMode, RankedResult, SemanticWeights};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where an evaluation currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum EvaluationState {
    #[default]
    Idle,
    FetchingReference,
    Scoring,
    Done,
    Error(String),
}

/// Published state, tagged with the generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationStatus {
    pub generation: u64,
    #[serde(flatten)]
    pub state: EvaluationState,
}

/// How candidates are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Each candidate against every other candidate
    Pairwise,
    /// Each candidate's back-translation against the original text
    #[default]
    Reference,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Pairwise => write!(f, "pairwise"),
            EvaluationMode::Reference => write!(f, "reference"),
        }
    }
}

impl FromStr for EvaluationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pairwise" => Ok(EvaluationMode::Pairwise),
            "reference" => Ok(EvaluationMode::Reference),
            other => anyhow::bail!("Unknown evaluation mode '{}' (expected reference or pairwise)", other),
        }
    }
}

/// Everything one evaluation needs.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub original_text: String,
    pub source: Language,
    pub target: Language,
    pub candidates: Vec<Candidate>,
    pub mode: EvaluationMode,
}

impl EvaluationRequest {
    pub fn new(
        original_text: impl Into<String>,
        source: Language,
        target: Language,
        candidates: Vec<Candidate>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            source,
            target,
            candidates,
            mode: EvaluationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Completed(RankedResult),
    /// A newer evaluation started before this one finished; nothing was published.
    Superseded,
}

/// Evaluation orchestrator. Share it behind an `Arc` across tasks.
pub struct Evaluator {
    collaborator: Arc<dyn BackTranslator>,
    cache: ReferenceCache,
    aggregator: Aggregator,
    generation: AtomicU64,
    latest: Mutex<Option<RankedResult>>,
    status: watch::Sender<EvaluationStatus>,
    metrics: EvaluationMetrics,
}

impl Evaluator {
    pub fn new(
        collaborator: Arc<dyn BackTranslator>,
        store: Arc<dyn ReferenceStore>,
        weights: SemanticWeights,
    ) -> Self {
        let (status, _) = watch::channel(EvaluationStatus::default());

        Self {
            collaborator,
            cache: ReferenceCache::new(store),
            aggregator: Aggregator::new(weights),
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
            status,
            metrics: EvaluationMetrics::new(),
        }
    }

    /// Current published status.
    pub fn status(&self) -> EvaluationStatus {
        self.status.borrow().clone()
    }

    /// Receive every status change from now on.
    pub fn subscribe(&self) -> watch::Receiver<EvaluationStatus> {
        self.status.subscribe()
    }

    /// The most recently published ranking.
    pub fn latest(&self) -> Option<RankedResult> {
        self.latest.lock().clone()
    }

    pub fn metrics(&self) -> &EvaluationMetrics {
        &self.metrics
    }

    /// Evaluate `request` and publish the ranking.
    ///
    /// In reference mode a collaborator failure is returned as an error and
    /// published as [`EvaluationState::Error`]; there is no fallback to
    /// pairwise comparison.
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let scorable = request.candidates.iter().filter(|c| c.is_scorable()).count();
        info!(
            "Evaluation #{}: {} of {} candidates scorable ({} mode)",
            generation,
            scorable,
            request.candidates.len(),
            request.mode
        );

        if scorable == 0 {
            return Ok(self.complete(generation, RankedResult::default()));
        }

        let bundle = match request.mode {
            EvaluationMode::Pairwise => None,
            EvaluationMode::Reference => match self.reference_bundle(generation, request).await {
                Ok(bundle) => Some(bundle),
                Err(e) => {
                    if self.publish(generation, EvaluationState::Error(e.to_string()), None) {
                        return Err(e);
                    }
                    debug!("Evaluation #{} failed after being superseded: {}", generation, e);
                    self.metrics.record_superseded();
                    return Ok(EvaluationOutcome::Superseded);
                }
            },
        };

        if !self.publish(generation, EvaluationState::Scoring, None) {
            self.metrics.record_superseded();
            return Ok(EvaluationOutcome::Superseded);
        }

        let mode = match &bundle {
            Some(bundle) => ComparisonMode::Reference(bundle),
            None => ComparisonMode::Pairwise,
        };
        let ranked = self.aggregator.aggregate(&request.candidates, mode);

        Ok(self.complete(generation, ranked))
    }

    /// Look the bundle up in the cache, fetching and storing it on a miss.
    async fn reference_bundle(
        &self,
        generation: u64,
        request: &EvaluationRequest,
    ) -> Result<ReferenceBundle, EvaluationError> {
        let fingerprint = fingerprint(request.source, request.target, &request.candidates);

        if let Some(bundle) = self.cache.load(&fingerprint) {
            self.metrics.record_cache_hit();
            debug!(
                "Reference cache hit for {} ({} back-translations)",
                fingerprint,
                bundle.resolved_count()
            );
            return Ok(bundle.with_original(&request.original_text));
        }

        self.metrics.record_cache_miss();
        self.publish(generation, EvaluationState::FetchingReference, None);

        let payload = BackTranslationRequest::from_candidates(request.source, request.target, &request.candidates);

        self.metrics.record_collaborator_call();
        let response = self
            .collaborator
            .back_translate(&payload)
            .await
            .inspect_err(|_| self.metrics.record_collaborator_failure())?;
        let unavailable = response.unavailable.len();
        let bundle = response
            .into_bundle(&request.original_text, &payload)
            .inspect_err(|_| self.metrics.record_collaborator_failure())?;

        info!(
            "Fetched {} of {} back-translations",
            bundle.resolved_count(),
            payload.candidates.len()
        );

        // Only complete answers are cached
        if bundle.resolved_count() == 0 {
            warn!("No back-translations resolved, not caching {}", fingerprint);
        } else if unavailable > 0 {
            warn!(
                "{} back-translations unavailable, not caching {}",
                unavailable, fingerprint
            );
        } else if let Err(e) = self.cache.save(&fingerprint, &bundle) {
            warn!("Failed to cache back-translations: {:#}", e);
        }

        Ok(bundle)
    }

    fn complete(&self, generation: u64, ranked: RankedResult) -> EvaluationOutcome {
        if self.publish(generation, EvaluationState::Done, Some(ranked.clone())) {
            EvaluationOutcome::Completed(ranked)
        } else {
            self.metrics.record_superseded();
            EvaluationOutcome::Superseded
        }
    }

    /// Publish `state` (and `result`, if any) when `generation` is still the newest.
    fn publish(&self, generation: u64, state: EvaluationState, result: Option<RankedResult>) -> bool {
        let mut latest = self.latest.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Evaluation #{} is stale, not publishing {:?}", generation, state);
            return false;
        }

        if let Some(result) = result {
            *latest = Some(result);
        }
        self.status.send_replace(EvaluationStatus { generation, state });
        true
    }
}
