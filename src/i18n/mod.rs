//! Supported languages.
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Validated `Language` type used in prompts, requests and cache fingerprints
//!
//! # Example
//!
//! ```rust,ignore
//! use translation_evaluator::i18n::{Language, LanguageRegistry};
//!
//! let spanish = Language::parse("Spanish")?;
//! let languages = LanguageRegistry::get().list_enabled();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
