// Keyword extraction

use std::collections::BTreeMap;

use regex::Regex;
use sealdex_core::{Result, SealdexError};

/// Word pattern: runs of word characters and hyphens
pub const WORD_PATTERN: &str = r"\b[\w-]+\b";

/// Lowercasing word counter
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    /// Compile the word pattern
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(WORD_PATTERN)
            .map_err(|e| SealdexError::configuration(format!("invalid word pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// Words of `text` in order of appearance, lowercased
    pub fn words<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
    }

    /// Occurrence count of each word in `text`
    pub fn term_counts(&self, text: &str) -> BTreeMap<String, u64> {
        let lowered = text.to_lowercase();
        let mut counts = BTreeMap::new();
        for m in self.pattern.find_iter(&lowered) {
            *counts.entry(m.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_are_case_insensitive() {
        let tokenizer = Tokenizer::new().unwrap();
        let counts = tokenizer
            .term_counts("Cloud Computing Cloud computing is the delivery of computing services.");
        assert_eq!(counts["computing"], 3);
        assert_eq!(counts["cloud"], 2);
        assert_eq!(counts["services"], 1);
        assert!(!counts.contains_key("Cloud"));
    }

    #[test]
    fn test_hyphenated_words_stay_whole() {
        let tokenizer = Tokenizer::new().unwrap();
        let words: Vec<_> = tokenizer.words("State-of-the-art, end-to-end!").collect();
        assert_eq!(words, vec!["state-of-the-art", "end-to-end"]);
    }

    #[test]
    fn test_unicode_words() {
        let tokenizer = Tokenizer::new().unwrap();
        let counts = tokenizer.term_counts("Naïve café naïve");
        assert_eq!(counts["naïve"], 2);
        assert_eq!(counts["café"], 1);
    }
}
