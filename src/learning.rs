// File: src/learning.rs
use crate::core::{frequency::FrequencyStore, vocab::Vocabulary};
use crate::error::{ClassifierError, Result};

/// Applies labelled documents to a model's vocabulary and frequency store.
#[derive(Debug, Clone)]
pub struct LearningEngine {
    frequency_increment: u64,
}

/// One labelled, already tokenized document.
pub struct TrainingExample<'a, S: AsRef<str>> {
    pub words: &'a [S],
    pub category: &'a str,
}

/// What a single training call added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnReport {
    pub words: usize,
    pub tokens: usize,
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningEngine {
    pub fn new() -> Self {
        Self {
            frequency_increment: 1,
        }
    }

    /// Counts every realized window of length 1..=`max_ngram` in the
    /// document towards the example's category.
    pub fn learn<S: AsRef<str>>(
        &self,
        vocab: &mut Vocabulary,
        store: &mut FrequencyStore,
        max_ngram: usize,
        example: &TrainingExample<'_, S>,
    ) -> Result<LearnReport> {
        if example.words.is_empty() {
            return Err(ClassifierError::EmptyDocument);
        }

        let ids: Vec<_> = example
            .words
            .iter()
            .map(|w| vocab.get_or_intern(w.as_ref()))
            .collect();

        let category = store.ensure_category(example.category);
        let mut tokens = 0;
        for start in 0..ids.len() {
            let longest = max_ngram.min(ids.len() - start);
            for len in 1..=longest {
                store.increment_at(category, &ids[start..start + len], self.frequency_increment);
                tokens += 1;
            }
        }
        store.record_documents(category, 1);

        tracing::debug!(
            "learned {} words ({} tokens) for '{}'",
            ids.len(),
            tokens,
            example.category
        );
        Ok(LearnReport {
            words: ids.len(),
            tokens,
        })
    }
}
