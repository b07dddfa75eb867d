//! Word tokenizer shared by every scorer.

use regex::Regex;
use std::sync::OnceLock;

/// Anything that is neither a word character nor whitespace (Unicode-aware)
static PUNCTUATION_REGEX: OnceLock<Regex> = OnceLock::new();

/// Normalize `text` and split it into lowercase word tokens.
///
/// The text is lowercased one character at a time, every character that is
/// not a Unicode word character or whitespace is removed, and the remainder is
/// split on runs of whitespace. Empty or whitespace-only input yields an empty
/// vector.
///
/// Lowercasing ignores context, so a word-final `Σ` becomes `σ` (not `ς`) and
/// the same letter always maps to the same token.
pub fn tokenize(text: &str) -> Vec<String> {
    let regex = PUNCTUATION_REGEX.get_or_init(|| Regex::new(r"[^\w\s]").unwrap());

    let lowered: String = text.chars().flat_map(char::to_lowercase).collect();
    regex
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
