//! Read-only views over what a model has learned: per-category vocabulary
//! rankings, stop-word detection and next-word suggestions.

use crate::core::engine::Classifier;
use crate::core::types::WordId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One learned token of a category with its confidence values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub term: String,
    pub count: u64,
    pub lv: f64,
    pub gv: f64,
    pub sgv: f64,
}

impl Classifier {
    /// The category's tokens ranked by sanctioned global value, highest
    /// first. `limit = None` returns everything.
    pub fn category_vocabulary(&self, category: &str, limit: Option<usize>) -> Result<Vec<VocabularyEntry>> {
        let category_id = self.store().category_id(category)?;
        let table = self.store().table_by_name(category)?;
        let engine = self.confidence();

        let mut entries: Vec<VocabularyEntry> = table
            .tokens()
            .map(|(token, count)| {
                let values = engine.breakdown(token.words())[category_id];
                VocabularyEntry {
                    term: self.vocabulary().render(token),
                    count,
                    lv: values.lv,
                    gv: values.gv,
                    sgv: values.sgv,
                }
            })
            .collect();
        entries.sort_by(|a, b| {
            b.sgv
                .total_cmp(&a.sgv)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.term.cmp(&b.term))
        });
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Seen words whose significance stays below `threshold` in every
    /// category, most frequent first.
    pub fn stopwords(&self, threshold: f64) -> Vec<String> {
        let mut totals: HashMap<WordId, u64> = HashMap::new();
        for (_, table) in self.store().tables() {
            for (token, count) in table.tokens() {
                if let [word] = token.words() {
                    *totals.entry(*word).or_insert(0) += count;
                }
            }
        }

        let engine = self.confidence();
        let mut stopwords: Vec<(String, u64)> = totals
            .into_iter()
            .filter(|(word, _)| {
                engine
                    .breakdown(&[*word])
                    .iter()
                    .all(|values| values.sg < threshold)
            })
            .filter_map(|(word, total)| {
                self.vocabulary()
                    .word(word)
                    .map(|w| (w.to_string(), total))
            })
            .collect();
        stopwords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stopwords.into_iter().map(|(w, _)| w).collect()
    }

    /// Words most often seen right after `context`, with their counts summed
    /// over every category. Needs `context` to be shorter than `max_ngram`.
    pub fn next_words(&self, context: &str, limit: usize) -> Vec<(String, u64)> {
        let words = self.tokenize(context);
        if words.is_empty() || words.len() >= self.max_ngram() {
            return Vec::new();
        }
        let Some(prefix) = self.vocabulary().token_for(&words) else {
            return Vec::new();
        };

        let mut followers: HashMap<WordId, u64> = HashMap::new();
        for (_, table) in self.store().tables() {
            for (token, count) in table.tokens() {
                let ids = token.words();
                if ids.len() == prefix.len() + 1 && ids.starts_with(prefix.words()) {
                    *followers.entry(ids[prefix.len()]).or_insert(0) += count;
                }
            }
        }

        let mut ranked: Vec<(String, u64)> = followers
            .into_iter()
            .filter_map(|(id, count)| self.vocabulary().word(id).map(|w| (w.to_string(), count)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}
