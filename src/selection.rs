//! What the user asked for: their role, the language pair, and the source text.

use crate::i18n::Language;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The user's background, used to tune translation terminology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Student,
    Educator,
    Professional,
    Researcher,
    #[default]
    Other,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Educator,
        Role::Professional,
        Role::Researcher,
        Role::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Educator => "Educator",
            Role::Professional => "Professional",
            Role::Researcher => "Researcher",
            Role::Other => "Other",
        }
    }

    /// Whether prompts should ask for role-specific terminology.
    pub fn has_terminology(&self) -> bool {
        !matches!(self, Role::Other)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown role: '{}'", s))
    }
}

/// A complete, validated translation request from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSelection {
    pub role: Role,
    pub source: Language,
    pub target: Language,
    pub text: String,
}

impl TranslationSelection {
    /// Build a selection, rejecting empty text and identical languages.
    pub fn new(role: Role, source: Language, target: Language, text: impl Into<String>) -> Result<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            bail!("Source text is empty");
        }
        if source == target {
            bail!(
                "Source and target language are both {}; pick two different languages",
                source
            );
        }

        Ok(Self {
            role,
            source,
            target,
            text,
        })
    }
}
