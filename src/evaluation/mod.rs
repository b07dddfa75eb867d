//! Evaluation orchestration: reference fetching, caching, and publishing
//! ranked results.
//!
//! # Architecture
//!
//! - `collaborator`: Back-translation wire types and the [`BackTranslator`] implementations
//! - `cache`: Fingerprinted persistence of reference bundles
//! - `orchestrator`: The [`Evaluator`] state machine
//! - `error`: [`EvaluationError`]

mod cache;
mod collaborator;
mod error;
mod orchestrator;

pub use cache::{fingerprint, FileStore, MemoryStore, ReferenceCache, ReferenceStore};
pub use collaborator::{
    BackTranslationEntry, BackTranslationRequest, BackTranslationResponse, BackTranslator,
    CandidatePayload, HttpBackTranslator, ProviderBackTranslator,
};
pub use error::EvaluationError;
pub use orchestrator::{
    EvaluationMode, EvaluationOutcome, EvaluationRequest, EvaluationState, EvaluationStatus,
    Evaluator,
};
