//! Topic normalization
//!
//! Canonicalizes a raw topic string before it is embedded or stored, so
//! that trivially different phrasings ("I want to build a portfolio
//! website" vs "portfolio website") produce the same text and therefore
//! the same embedding.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Filler words stripped during normalization. Articles, pronouns and
/// generic verbs of intent that carry no topical meaning.
static DEFAULT_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "i", "want", "to", "for", "make", "create", "build", "need", "looking",
        "develop", "im",
    ]
    .into_iter()
    .collect()
});

/// Deterministic text canonicalizer.
///
/// `normalize` is pure, idempotent and never fails. An input consisting
/// only of stop words and punctuation normalizes to the empty string;
/// callers must tolerate that (an empty topic still embeds and indexes
/// deterministically).
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: HashSet<String>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl TextNormalizer {
    /// Create a normalizer with the default stop-word set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with a custom stop-word set.
    ///
    /// Words are matched after lowercasing and punctuation removal, so
    /// the set should contain lowercase, punctuation-free tokens.
    pub fn with_stop_words<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stop_words: stop_words.into_iter().map(Into::into).collect(),
        }
    }

    /// Canonicalize a topic string.
    ///
    /// Lowercases, strips everything that is not alphanumeric or
    /// whitespace, drops stop words and collapses whitespace runs.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();

        let stripped: String = lowered
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        stripped
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_trim() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("  Rust Web Server  "), "rust web server");
    }

    #[test]
    fn test_punctuation_removed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("e-commerce, store! (with cart?)"),
            "ecommerce store with cart"
        );
    }

    #[test]
    fn test_stop_words_removed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("I want to build a portfolio website"),
            "portfolio website"
        );
    }

    #[test]
    fn test_whitespace_collapsed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("blog   \t platform\n engine"), "blog platform engine");
    }

    #[test]
    fn test_only_stop_words_yields_empty() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("I want to make a..."), "");
        assert_eq!(normalizer.normalize("!!! ???"), "");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_idempotent() {
        let normalizer = TextNormalizer::new();
        let inputs = [
            "I want to build a Portfolio Website!",
            "Create a portfolio site for me",
            "  plain topic  ",
            "",
        ];

        for input in inputs {
            let once = normalizer.normalize(input);
            let twice = normalizer.normalize(&once);
            assert_eq!(once, twice, "normalize must be idempotent for {input:?}");
        }
    }

    #[test]
    fn test_custom_stop_words() {
        let normalizer = TextNormalizer::with_stop_words(["please", "kindly"]);
        assert_eq!(
            normalizer.normalize("Please kindly build a site"),
            "build a site"
        );
    }

    #[test]
    fn test_paraphrases_share_tokens() {
        let normalizer = TextNormalizer::new();
        let a = normalizer.normalize("I want to build a portfolio website");
        let b = normalizer.normalize("Create a portfolio site for me");

        assert!(a.contains("portfolio"));
        assert!(b.contains("portfolio"));
    }
}
