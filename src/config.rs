use crate::provider::{default_models, ModelSpec, DEFAULT_API_URL};
use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_REFERENCE_CACHE_PATH: &str = ".cache/back_translations.json";

#[derive(Debug, Clone)]
pub struct Config {
    // Translation provider
    pub openrouter_api_key: String,
    pub openrouter_api_url: String,
    pub models: Vec<ModelSpec>,

    // Back-translation service (provider-backed when unset)
    pub back_translation_url: Option<String>,

    // Reference cache
    pub reference_cache_path: String,

    // HTTP
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let models = match std::env::var("TRANSLATION_MODELS") {
            Ok(value) if !value.trim().is_empty() => {
                parse_models(&value).context("Invalid TRANSLATION_MODELS")?
            }
            _ => default_models(),
        };

        Ok(Self {
            // Translation provider
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY")
                .context("OPENROUTER_API_KEY not set")?,
            openrouter_api_url: std::env::var("OPENROUTER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            models,

            // Back-translation service
            back_translation_url: std::env::var("BACK_TRANSLATION_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            // Reference cache
            reference_cache_path: std::env::var("REFERENCE_CACHE_PATH")
                .unwrap_or_else(|_| DEFAULT_REFERENCE_CACHE_PATH.to_string()),

            // HTTP
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse a `key=model_id` comma-separated roster.
///
/// Keys from the default roster keep their display name; other keys are
/// displayed as written.
pub fn parse_models(value: &str) -> Result<Vec<ModelSpec>> {
    let defaults = default_models();
    let mut models: Vec<ModelSpec> = Vec::new();

    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key, model_id)) = entry.split_once('=') else {
            bail!("Expected key=model_id, got '{}'", entry);
        };
        let (key, model_id) = (key.trim(), model_id.trim());
        if key.is_empty() || model_id.is_empty() {
            bail!("Expected key=model_id, got '{}'", entry);
        }
        if models.iter().any(|m| m.key == key) {
            bail!("Duplicate model key '{}'", key);
        }

        let display_name = defaults
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.display_name.clone())
            .unwrap_or_else(|| key.to_string());
        models.push(ModelSpec::new(key, display_name, model_id));
    }

    if models.is_empty() {
        bail!("No models configured");
    }

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "OPENROUTER_API_KEY",
        "OPENROUTER_API_URL",
        "TRANSLATION_MODELS",
        "BACK_TRANSLATION_URL",
        "REFERENCE_CACHE_PATH",
        "REQUEST_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    // ==================== from_env Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");

        let config = Config::from_env().expect("Should load");

        assert_eq!(config.openrouter_api_key, "sk-test");
        assert_eq!(config.openrouter_api_url, DEFAULT_API_URL);
        assert_eq!(config.models, default_models());
        assert_eq!(config.back_translation_url, None);
        assert_eq!(config.reference_cache_path, DEFAULT_REFERENCE_CACHE_PATH);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_api_key() {
        clear_env();

        let error = Config::from_env().unwrap_err();
        assert!(error.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");
        std::env::set_var("OPENROUTER_API_URL", "http://localhost:9000/chat");
        std::env::set_var("TRANSLATION_MODELS", "claude=anthropic/claude-3.7-sonnet");
        std::env::set_var("BACK_TRANSLATION_URL", "http://localhost:3000/api/back-translate");
        std::env::set_var("REFERENCE_CACHE_PATH", "/tmp/refs.json");
        std::env::set_var("REQUEST_TIMEOUT_SECS", "15");

        let config = Config::from_env().expect("Should load");

        assert_eq!(config.openrouter_api_url, "http://localhost:9000/chat");
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].display_name, "Claude");
        assert_eq!(
            config.back_translation_url.as_deref(),
            Some("http://localhost:3000/api/back-translate")
        );
        assert_eq!(config.reference_cache_path, "/tmp/refs.json");
        assert_eq!(config.request_timeout_secs, 15);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout_uses_default() {
        clear_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");
        std::env::set_var("REQUEST_TIMEOUT_SECS", "soon");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.request_timeout_secs, 60);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_bad_models_is_error() {
        clear_env();
        std::env::set_var("OPENROUTER_API_KEY", "sk-test");
        std::env::set_var("TRANSLATION_MODELS", "just-a-model-id");

        let error = Config::from_env().unwrap_err();
        assert!(format!("{:#}", error).contains("TRANSLATION_MODELS"));

        clear_env();
    }

    // ==================== parse_models Tests ====================

    #[test]
    fn test_parse_models_custom_key() {
        let models = parse_models("mistral=mistralai/mistral-large, chatgpt=openai/gpt-4o").unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].key, "mistral");
        assert_eq!(models[0].display_name, "mistral");
        assert_eq!(models[1].display_name, "ChatGPT");
        assert_eq!(models[1].model_id, "openai/gpt-4o");
    }

    #[test]
    fn test_parse_models_rejects_duplicates_and_blanks() {
        assert!(parse_models("a=x,a=y").is_err());
        assert!(parse_models("=x").is_err());
        assert!(parse_models(" , ").is_err());
    }
}
