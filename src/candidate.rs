//! Candidate translations and the reference data used to score them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One model's translation output.
///
/// A candidate is created once per provider response and never changes
/// afterwards. Failed candidates carry a `failure_reason` and are never scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Stable identifier of the provider (e.g. "chatgpt")
    pub key: String,

    /// Human-readable provider name (e.g. "ChatGPT")
    pub display_name: String,

    /// Translated text, if the provider returned one
    pub text: Option<String>,

    /// Why the provider failed, if it did
    pub failure_reason: Option<String>,
}

impl Candidate {
    /// Create a successful candidate.
    pub fn translated(
        key: impl Into<String>,
        display_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            text: Some(text.into()),
            failure_reason: None,
        }
    }

    /// Create a failed candidate.
    pub fn failed(
        key: impl Into<String>,
        display_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            text: None,
            failure_reason: Some(reason.into()),
        }
    }

    /// The text to score, or `None` if this candidate must be excluded.
    ///
    /// An empty translation is still scorable.
    pub fn scorable_text(&self) -> Option<&str> {
        match (&self.text, &self.failure_reason) {
            (Some(text), None) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_scorable(&self) -> bool {
        self.scorable_text().is_some()
    }
}

/// Back-translations of every candidate, plus the original they are measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceBundle {
    /// The user's source text
    pub original_text: String,

    /// Back-translation per candidate key (`None` when unavailable)
    pub back_translations: BTreeMap<String, Option<String>>,

    /// When the collaborator produced this bundle
    pub cached_at: DateTime<Utc>,
}

impl ReferenceBundle {
    pub fn new(
        original_text: impl Into<String>,
        back_translations: BTreeMap<String, Option<String>>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            back_translations,
            cached_at: Utc::now(),
        }
    }

    /// Resolved back-translation for a candidate key. An empty reply counts as unresolved.
    pub fn back_translation(&self, key: &str) -> Option<&str> {
        self.back_translations
            .get(key)?
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Same back-translations measured against a different original text.
    pub fn with_original(mut self, original_text: impl Into<String>) -> Self {
        self.original_text = original_text.into();
        self
    }

    /// Number of candidates with a resolved back-translation.
    pub fn resolved_count(&self) -> usize {
        self.back_translations
            .values()
            .filter(|v| v.as_deref().is_some_and(|text| !text.is_empty()))
            .count()
    }
}
