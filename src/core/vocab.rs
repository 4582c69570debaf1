// --- File: src/core/vocab.rs
use crate::core::types::{Token, WordId};
use indexmap::IndexSet;

/// Model-wide word interner. Ids are stable for the life of the model and
/// shared by every category table.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: IndexSet<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or creates the id for `word`.
    pub fn get_or_intern(&mut self, word: &str) -> WordId {
        if let Some(id) = self.words.get_index_of(word) {
            id
        } else {
            self.words.insert_full(word.to_string()).0
        }
    }

    pub fn id(&self, word: &str) -> Option<WordId> {
        self.words.get_index_of(word)
    }

    pub fn word(&self, id: WordId) -> Option<&str> {
        self.words.get_index(id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Maps words to ids without interning; unknown words become `None`.
    pub fn lookup_all<S: AsRef<str>>(&self, words: &[S]) -> Vec<Option<WordId>> {
        words.iter().map(|w| self.id(w.as_ref())).collect()
    }

    /// Resolves every word of a phrase, or `None` if any is unknown.
    pub fn token_for<S: AsRef<str>>(&self, words: &[S]) -> Option<Token> {
        words
            .iter()
            .map(|w| self.id(w.as_ref()))
            .collect::<Option<Vec<_>>>()
            .map(Token::new)
    }

    /// Renders a token back into its words joined by spaces.
    pub fn render(&self, token: &Token) -> String {
        token
            .words()
            .iter()
            .map(|&id| self.word(id).unwrap_or("<unk>"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn words_of(&self, token: &Token) -> Vec<String> {
        token
            .words()
            .iter()
            .map(|&id| self.word(id).unwrap_or("<unk>").to_string())
            .collect()
    }
}
