//! The back-translation collaborator: translates each candidate back into the
//! source language so it can be compared with the original text.

use super::error::EvaluationError;
use crate::candidate::{Candidate, ReferenceBundle};
use crate::i18n::Language;
use crate::provider::{ModelSpec, ProviderClient};
use crate::retry::{is_retryable_error, status_error, with_retry_if, RetryConfig};
use crate::selection::Role;
use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Request body sent to the back-translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackTranslationRequest {
    pub candidates: Vec<CandidatePayload>,
    /// English name of the original language (e.g. "English")
    pub source_lang: String,
    /// English name of the translation language (e.g. "Spanish")
    pub target_lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePayload {
    pub key: String,
    pub name: String,
    pub translation: String,
}

impl BackTranslationRequest {
    /// Build a request from the scorable candidates; failed ones are left out.
    pub fn from_candidates(source: Language, target: Language, candidates: &[Candidate]) -> Self {
        let candidates = candidates
            .iter()
            .filter_map(|c| {
                c.scorable_text().map(|text| CandidatePayload {
                    key: c.key.clone(),
                    name: c.display_name.clone(),
                    translation: text.to_string(),
                })
            })
            .collect();

        Self {
            candidates,
            source_lang: source.name().to_string(),
            target_lang: target.name().to_string(),
        }
    }
}

/// Response body of the back-translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackTranslationResponse {
    pub back_translations: Vec<BackTranslationEntry>,

    /// Keys whose back-translation failed in transport and may succeed on a
    /// later attempt. Never sent over the wire.
    #[serde(skip)]
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackTranslationEntry {
    pub key: String,
    #[serde(default)]
    pub back_translation: Option<String>,
}

impl BackTranslationResponse {
    /// Turn the response into a bundle covering every requested candidate.
    ///
    /// Requested keys missing from the response map to `None`. Keys that were
    /// never requested are ignored. A key answered twice is malformed.
    pub fn into_bundle(
        self,
        original_text: &str,
        request: &BackTranslationRequest,
    ) -> Result<ReferenceBundle, EvaluationError> {
        let mut back_translations: BTreeMap<String, Option<String>> = request
            .candidates
            .iter()
            .map(|c| (c.key.clone(), None))
            .collect();

        let mut seen = HashSet::new();
        for entry in self.back_translations {
            if !seen.insert(entry.key.clone()) {
                return Err(EvaluationError::MalformedResponse(format!(
                    "duplicate key '{}'",
                    entry.key
                )));
            }

            match back_translations.get_mut(&entry.key) {
                Some(slot) => *slot = entry.back_translation,
                None => debug!("Ignoring back-translation for unrequested key '{}'", entry.key),
            }
        }

        Ok(ReferenceBundle::new(original_text, back_translations))
    }
}

/// Anything that can back-translate a set of candidates.
#[async_trait]
pub trait BackTranslator: Send + Sync {
    async fn back_translate(
        &self,
        request: &BackTranslationRequest,
    ) -> Result<BackTranslationResponse, EvaluationError>;
}

/// Calls a back-translation service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackTranslator {
    client: reqwest::Client,
    url: String,
    retry: RetryConfig,
}

impl HttpBackTranslator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            retry: RetryConfig::back_translation(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl BackTranslator for HttpBackTranslator {
    async fn back_translate(
        &self,
        request: &BackTranslationRequest,
    ) -> Result<BackTranslationResponse, EvaluationError> {
        info!(
            "Requesting back-translations for {} candidates ({} -> {})",
            request.candidates.len(),
            request.target_lang,
            request.source_lang
        );

        let body = with_retry_if(
            &self.retry,
            "Back-translation",
            || async {
                let response = self
                    .client
                    .post(&self.url)
                    .json(request)
                    .send()
                    .await
                    .context("Failed to send back-translation request")?;

                if !response.status().is_success() {
                    return Err(status_error("Back-translation service", response).await);
                }

                let body = response
                    .text()
                    .await
                    .context("Failed to read back-translation response")?;
                Ok::<_, anyhow::Error>(body)
            },
            is_retryable_error,
        )
        .await
        .map_err(EvaluationError::Collaborator)?;

        serde_json::from_str(&body).map_err(|e| EvaluationError::MalformedResponse(e.to_string()))
    }
}

/// Back-translates through the translation provider, one model per candidate.
///
/// Each candidate is sent back through the model that produced it. A model
/// that fails (or a key with no matching model) yields a `None` entry, which
/// only excludes that candidate. When every entry is `None` and at least one
/// model call failed, the whole request fails.
#[derive(Debug, Clone)]
pub struct ProviderBackTranslator {
    provider: ProviderClient,
    models: Vec<ModelSpec>,
    role: Role,
}

impl ProviderBackTranslator {
    pub fn new(provider: ProviderClient, models: Vec<ModelSpec>, role: Role) -> Self {
        Self {
            provider,
            models,
            role,
        }
    }
}

#[async_trait]
impl BackTranslator for ProviderBackTranslator {
    async fn back_translate(
        &self,
        request: &BackTranslationRequest,
    ) -> Result<BackTranslationResponse, EvaluationError> {
        let original_language =
            Language::parse(&request.source_lang).map_err(EvaluationError::Collaborator)?;

        let jobs = request.candidates.iter().map(|candidate| async move {
            let result = match self.models.iter().find(|m| m.key == candidate.key) {
                Some(model) => self
                    .provider
                    .back_translate(model, self.role, original_language, &candidate.translation)
                    .await
                    .map(Some)
                    .map_err(|e| {
                        warn!("Back-translation with {} failed: {:#}", model.display_name, e);
                        e
                    }),
                None => {
                    warn!("No model configured for candidate '{}'", candidate.key);
                    Ok(None)
                }
            };
            (candidate.key.clone(), result)
        });

        let mut back_translations = Vec::with_capacity(request.candidates.len());
        let mut unavailable = Vec::new();
        let mut last_error = None;

        for (key, result) in join_all(jobs).await {
            let back_translation = match result {
                Ok(text) => text,
                Err(e) => {
                    unavailable.push(key.clone());
                    last_error = Some(e);
                    None
                }
            };
            back_translations.push(BackTranslationEntry {
                key,
                back_translation,
            });
        }

        if let Some(error) = last_error {
            if back_translations
                .iter()
                .all(|e| e.back_translation.as_deref().map_or(true, str::is_empty))
            {
                return Err(EvaluationError::Collaborator(error.context(format!(
                    "all {} back-translation attempts failed",
                    unavailable.len()
                ))));
            }
        }

        Ok(BackTranslationResponse {
            back_translations,
            unavailable,
        })
    }
}
