// File: src/core/tokenizer.rs
use serde::{Deserialize, Serialize};

/// Splits raw text into an ordered sequence of words.
pub trait Tokenizer: Send + Sync + std::fmt::Debug {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Options for [`WordTokenizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    pub lowercase: bool,
    /// Replaces every run of digits with this word when set.
    pub number_placeholder: Option<String>,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            number_placeholder: None,
        }
    }
}

/// Alphanumeric word splitter. Apostrophes inside a word are kept
/// ("don't"), every other non-alphanumeric character separates words.
#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    options: TokenizerOptions,
}

impl WordTokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Self { options }
    }

    fn finish(&self, word: &mut String, words: &mut Vec<String>) {
        let trimmed = word.trim_end_matches('\'');
        if !trimmed.is_empty() {
            let is_number = trimmed.chars().all(|c| c.is_ascii_digit());
            match &self.options.number_placeholder {
                Some(placeholder) if is_number => words.push(placeholder.clone()),
                _ => words.push(trimmed.to_string()),
            }
        }
        word.clear();
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut word = String::new();

        for c in text.chars() {
            match c {
                c if c.is_alphanumeric() => {
                    if self.options.lowercase {
                        word.extend(c.to_lowercase());
                    } else {
                        word.push(c);
                    }
                }
                '\'' | '’' if !word.is_empty() => word.push('\''),
                _ => self.finish(&mut word, &mut words),
            }
        }
        self.finish(&mut word, &mut words);
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let t = WordTokenizer::default();
        assert_eq!(
            t.tokenize("Soccer match, TONIGHT!"),
            vec!["soccer", "match", "tonight"]
        );
    }

    #[test]
    fn test_apostrophes_and_punctuation() {
        let t = WordTokenizer::default();
        assert_eq!(t.tokenize("don't 'quote' x--y"), vec!["don't", "quote", "x", "y"]);
        assert!(t.tokenize("  ... !!").is_empty());
    }

    #[test]
    fn test_number_placeholder() {
        let t = WordTokenizer::new(TokenizerOptions {
            lowercase: false,
            number_placeholder: Some("NUM".to_string()),
        });
        assert_eq!(t.tokenize("Win 2024 cup4"), vec!["Win", "NUM", "cup4"]);
    }
}
