//! Chat-completions client for the translation provider (OpenRouter-compatible).
//!
//! Every configured model receives the same prompt; the responses become the
//! [`Candidate`]s that get scored.

use crate::candidate::Candidate;
use crate::i18n::Language;
use crate::retry::{is_retryable_error, status_error, with_retry_if, RetryConfig};
use crate::selection::{Role, TranslationSelection};
use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// One model in the translation roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Stable candidate key (e.g. "chatgpt")
    pub key: String,
    /// Name shown to users (e.g. "ChatGPT")
    pub display_name: String,
    /// Provider model identifier (e.g. "openai/gpt-4o-mini")
    pub model_id: String,
}

impl ModelSpec {
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            model_id: model_id.into(),
        }
    }
}

/// The five models translations are fanned out to by default.
pub fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("chatgpt", "ChatGPT", "openai/gpt-4o-mini"),
        ModelSpec::new("gemini", "Gemini", "google/gemini-2.0-flash-001"),
        ModelSpec::new("claude", "Claude", "anthropic/claude-3.5-haiku"),
        ModelSpec::new("deepseek", "DeepSeek", "deepseek/deepseek-chat"),
        ModelSpec::new("llama", "Llama", "meta-llama/llama-3.3-70b-instruct"),
    ]
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Build the prompt that translates `text` from `source` into `target`.
fn build_translation_prompt(role: Role, source: Language, target: Language, text: &str) -> String {
    let mut prompt = format!(
        "Please translate the following text from {} to {}. \
Make sure to preserve the semantics and meaning while keeping as many words the same as possible. ",
        source.name(),
        target.name()
    );
    if role.has_terminology() {
        prompt.push_str(&format!(
            "Use terminology and phrasing appropriate for a {}. ",
            role.as_str().to_lowercase()
        ));
    }
    prompt.push_str("Only return the translated text:\n\n");
    prompt.push_str(text);
    prompt
}

/// Build the prompt that translates `translated` back into `original_language`.
fn build_back_translation_prompt(role: Role, original_language: Language, translated: &str) -> String {
    let mut prompt = format!(
        "Please translate the following text back to {}. \
Make sure to preserve the semantics and meaning while keeping as many words the same as possible. ",
        original_language.name()
    );
    if role.has_terminology() {
        prompt.push_str(&format!(
            "Use terminology and phrasing appropriate for a {}. ",
            role.as_str().to_lowercase()
        ));
    }
    prompt.push_str("Only return the translated text:\n\n");
    prompt.push_str(translated);
    prompt
}

/// Client for the translation provider.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl ProviderClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            retry: RetryConfig::provider_call(),
        })
    }

    /// Override the retry policy (tests use [`RetryConfig::none`] or short delays)
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Send one prompt to one model and return the reply text.
    async fn complete(&self, model: &ModelSpec, prompt: &str, operation: &str) -> Result<String> {
        let request = ChatRequest {
            model: &model.model_id,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let body = with_retry_if(
            &self.retry,
            operation,
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .header("X-Title", "Translation Evaluator")
                    .json(&request)
                    .send()
                    .await
                    .context("Failed to send request to translation provider")?;

                if !response.status().is_success() {
                    return Err(status_error("Translation provider", response).await);
                }

                let body = response
                    .text()
                    .await
                    .context("Failed to read translation provider response")?;
                Ok::<_, anyhow::Error>(body)
            },
            is_retryable_error,
        )
        .await?;

        // Decoding errors are not retried
        let chat_response: ChatResponse =
            serde_json::from_str(&body).context("Failed to parse translation provider response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .context("Translation provider response contained no choices")
    }

    /// Translate the selection's text with a single model.
    pub async fn translate(&self, model: &ModelSpec, selection: &TranslationSelection) -> Result<String> {
        let prompt = build_translation_prompt(
            selection.role,
            selection.source,
            selection.target,
            &selection.text,
        );
        let operation = format!("Translation with {}", model.display_name);
        self.complete(model, &prompt, &operation).await
    }

    /// Translate a model's output back into the original language with the same model.
    pub async fn back_translate(
        &self,
        model: &ModelSpec,
        role: Role,
        original_language: Language,
        translated: &str,
    ) -> Result<String> {
        let prompt = build_back_translation_prompt(role, original_language, translated);
        let operation = format!("Back-translation with {}", model.display_name);
        self.complete(model, &prompt, &operation).await
    }

    /// Translate with every model concurrently.
    ///
    /// A failing model yields a failed [`Candidate`] rather than an error, so
    /// the result always has one entry per model, in roster order.
    pub async fn translate_all(
        &self,
        models: &[ModelSpec],
        selection: &TranslationSelection,
    ) -> Vec<Candidate> {
        info!(
            "Translating {} characters from {} to {} with {} models",
            selection.text.chars().count(),
            selection.source,
            selection.target,
            models.len()
        );

        let requests = models.iter().map(|model| async move {
            match self.translate(model, selection).await {
                Ok(text) => {
                    debug!("{} returned {} characters", model.display_name, text.len());
                    Candidate::translated(&model.key, &model.display_name, text)
                }
                Err(e) => {
                    warn!("{} translation failed: {:#}", model.display_name, e);
                    Candidate::failed(&model.key, &model.display_name, format!("{:#}", e))
                }
            }
        });

        join_all(requests).await
    }
}
