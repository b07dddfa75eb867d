//! Language type: validated language representation.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
///
/// Only supported, enabled languages can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "es")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const SPANISH: Language = Language { code: "es" };
    pub const FRENCH: Language = Language { code: "fr" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Parse a language from either its code or its name.
    ///
    /// ```ignore
    /// assert_eq!(Language::parse("es")?, Language::parse("Spanish")?);
    /// ```
    pub fn parse(value: &str) -> Result<Language> {
        let value = value.trim();
        if let Ok(language) = Language::from_code(&value.to_lowercase()) {
            return Ok(language);
        }

        match LanguageRegistry::get().get_by_name(value) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", value),
            None => bail!("Unknown language: '{}'", value),
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This should
    /// never happen if the Language was constructed through `from_code`,
    /// `parse` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the language name in its native form.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_constants_resolve() {
        assert_eq!(Language::ENGLISH.name(), "English");
        assert_eq!(Language::SPANISH.name(), "Spanish");
        assert_eq!(Language::FRENCH.native_name(), "Français");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        let language = Language::from_code("pt").expect("Should succeed");
        assert_eq!(language.code(), "pt");
        assert_eq!(language.name(), "Portuguese");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("xx");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    // ==================== parse Tests ====================

    #[test]
    fn test_parse_accepts_code_and_name() {
        assert_eq!(Language::parse("es").unwrap(), Language::SPANISH);
        assert_eq!(Language::parse("ES").unwrap(), Language::SPANISH);
        assert_eq!(Language::parse("Spanish").unwrap(), Language::SPANISH);
        assert_eq!(Language::parse("  spanish ").unwrap(), Language::SPANISH);
        assert_eq!(Language::parse("Español").unwrap(), Language::SPANISH);
    }

    #[test]
    fn test_parse_unknown() {
        let result = Language::parse("Elvish");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Elvish"));
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_display_uses_english_name() {
        assert_eq!(Language::ENGLISH.to_string(), "English");
        assert_eq!(format!("{}", Language::from_code("ja").unwrap()), "Japanese");
    }

    #[test]
    fn test_language_equality() {
        assert_eq!(Language::ENGLISH, Language::from_code("en").unwrap());
        assert_ne!(Language::ENGLISH, Language::SPANISH);
    }
}
