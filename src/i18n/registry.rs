//! Language registry: Single source of truth for all supported languages.
//!
//! This module provides a centralized registry of every language a user can
//! translate from or to. It uses a singleton pattern with `OnceLock` to ensure
//! thread-safe initialization and access.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English name of the language, as used in prompts (e.g., "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Español", "日本語")
    pub native_name: &'static str,

    /// Flag emoji shown next to the language
    pub flag: &'static str,

    /// Whether this language is enabled for use
    pub enabled: bool,
}

/// Global language registry singleton.
///
/// Initialized once on first access and immutable thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "en", "es")
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get a language configuration by its English or native name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| {
            lang.name.eq_ignore_ascii_case(name) || lang.native_name.to_lowercase() == name.to_lowercase()
        })
    }

    /// Get all enabled languages, in display order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

fn language(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    flag: &'static str,
) -> LanguageConfig {
    LanguageConfig {
        code,
        name,
        native_name,
        flag,
        enabled: true,
    }
}

/// Default language configurations, in the order they are offered to users.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        language("en", "English", "English", "🇺🇸"),
        language("es", "Spanish", "Español", "🇪🇸"),
        language("fr", "French", "Français", "🇫🇷"),
        language("de", "German", "Deutsch", "🇩🇪"),
        language("zh", "Chinese", "中文", "🇨🇳"),
        language("ja", "Japanese", "日本語", "🇯🇵"),
        language("ko", "Korean", "한국어", "🇰🇷"),
        language("pt", "Portuguese", "Português", "🇵🇹"),
        language("it", "Italian", "Italiano", "🇮🇹"),
        language("ru", "Russian", "Русский", "🇷🇺"),
    ]
}
