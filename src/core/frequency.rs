// File: src/core/frequency.rs
use crate::core::types::{CategoryId, CategoryStats, Token, WordId};
use crate::error::{ClassifierError, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Token counts learned for one category, plus aggregates kept in step with
/// every increment so confidence lookups read them in O(1).
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    /// Maps token -> frequency
    counts: HashMap<Token, u64>,
    total: u64,
    max: u64,
    documents: u64,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to a token's count. O(1) amortized complexity.
    fn add(&mut self, token: &[WordId], amount: u64) {
        let updated = if let Some(count) = self.counts.get_mut(token) {
            *count += amount;
            *count
        } else {
            self.counts.insert(Token::from_slice(token), amount);
            amount
        };
        self.total += amount;
        // Counts only ever grow, so the running max stays exact.
        self.max = self.max.max(updated);
    }

    pub fn count(&self, token: &[WordId]) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn total_count(&self) -> u64 {
        self.total
    }

    pub fn max_count(&self) -> u64 {
        self.max
    }

    pub fn vocabulary_size(&self) -> usize {
        self.counts.len()
    }

    pub fn documents(&self) -> u64 {
        self.documents
    }

    pub fn tokens(&self) -> impl Iterator<Item = (&Token, u64)> {
        self.counts.iter().map(|(t, &c)| (t, c))
    }

    pub fn stats(&self) -> CategoryStats {
        CategoryStats {
            documents: self.documents,
            total_count: self.total,
            max_count: self.max,
            vocabulary_size: self.counts.len(),
        }
    }
}

/// Per-category token frequencies, in category insertion order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyStore {
    categories: IndexMap<String, CategoryTable>,
}

impl FrequencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `category`, creating an empty table if absent.
    pub fn ensure_category(&mut self, category: &str) -> CategoryId {
        if let Some(id) = self.categories.get_index_of(category) {
            id
        } else {
            tracing::debug!("created category '{}'", category);
            self.categories
                .insert_full(category.to_string(), CategoryTable::new())
                .0
        }
    }

    /// Adds a new, empty category.
    pub fn add_category(&mut self, category: &str) -> Result<CategoryId> {
        if self.categories.contains_key(category) {
            return Err(ClassifierError::DuplicateCategory(category.to_string()));
        }
        Ok(self.ensure_category(category))
    }

    /// Removes a category and everything learned for it. Later categories
    /// keep their relative order.
    pub fn remove_category(&mut self, category: &str) -> Result<()> {
        if self.categories.shift_remove(category).is_none() {
            return Err(ClassifierError::UnknownCategory(category.to_string()));
        }
        tracing::debug!("removed category '{}'", category);
        Ok(())
    }

    /// Renames a category in place, keeping its position.
    pub fn rename_category(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return self.category_id(from).map(|_| ());
        }
        if self.categories.contains_key(to) {
            return Err(ClassifierError::DuplicateCategory(to.to_string()));
        }
        let (index, _, table) = self
            .categories
            .shift_remove_full(from)
            .ok_or_else(|| ClassifierError::UnknownCategory(from.to_string()))?;
        self.categories.shift_insert(index, to.to_string(), table);
        Ok(())
    }

    /// Adds `amount` occurrences of `token` to `category`, creating either
    /// on first sight. A zero amount or empty token is a no-op.
    pub fn increment(&mut self, category: &str, token: &[WordId], amount: u64) {
        if amount == 0 || token.is_empty() {
            return;
        }
        let id = self.ensure_category(category);
        self.categories[id].add(token, amount);
    }

    pub(crate) fn increment_at(&mut self, category: CategoryId, token: &[WordId], amount: u64) {
        if amount == 0 || token.is_empty() {
            return;
        }
        if let Some((_, table)) = self.categories.get_index_mut(category) {
            table.add(token, amount);
        }
    }

    pub(crate) fn record_documents(&mut self, category: CategoryId, documents: u64) {
        if let Some((_, table)) = self.categories.get_index_mut(category) {
            table.documents += documents;
        }
    }

    /// Folds every count of `source` into `target`, then removes `source`.
    pub fn merge(&mut self, target: &str, source: &str) -> Result<()> {
        self.category_id(target)?;
        self.category_id(source)?;
        if target == source {
            return Ok(());
        }
        let removed = self
            .categories
            .shift_remove(source)
            .ok_or_else(|| ClassifierError::UnknownCategory(source.to_string()))?;
        // Removing `source` may shift `target` down by one.
        let target_id = self.category_id(target)?;
        let table = &mut self.categories[target_id];
        for (token, count) in removed.counts {
            table.add(token.words(), count);
        }
        table.documents += removed.documents;
        tracing::debug!("merged category '{}' into '{}'", source, target);
        Ok(())
    }

    /// Count of `token` in `category`; 0 for anything unseen.
    pub fn count(&self, category: &str, token: &[WordId]) -> u64 {
        self.categories
            .get(category)
            .map(|t| t.count(token))
            .unwrap_or(0)
    }

    pub fn count_at(&self, category: CategoryId, token: &[WordId]) -> u64 {
        self.categories
            .get_index(category)
            .map(|(_, t)| t.count(token))
            .unwrap_or(0)
    }

    pub fn max_count(&self, category: &str) -> u64 {
        self.categories.get(category).map(|t| t.max).unwrap_or(0)
    }

    pub fn total_count(&self, category: &str) -> u64 {
        self.categories.get(category).map(|t| t.total).unwrap_or(0)
    }

    pub fn vocabulary_size(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map(|t| t.vocabulary_size())
            .unwrap_or(0)
    }

    pub fn category_id(&self, category: &str) -> Result<CategoryId> {
        self.categories
            .get_index_of(category)
            .ok_or_else(|| ClassifierError::UnknownCategory(category.to_string()))
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn table(&self, category: CategoryId) -> Option<&CategoryTable> {
        self.categories.get_index(category).map(|(_, t)| t)
    }

    pub fn table_by_name(&self, category: &str) -> Result<&CategoryTable> {
        self.categories
            .get(category)
            .ok_or_else(|| ClassifierError::UnknownCategory(category.to_string()))
    }

    pub fn category_name(&self, category: CategoryId) -> Option<&str> {
        self.categories.get_index(category).map(|(k, _)| k.as_str())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(|k| k.as_str())
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &CategoryTable)> {
        self.categories.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_creates_and_aggregates() {
        let mut store = FrequencyStore::new();
        store.increment("sports", &[0], 1);
        store.increment("sports", &[0], 2);
        store.increment("sports", &[1], 1);
        store.increment("sports", &[0, 1], 1);

        assert_eq!(store.count("sports", &[0]), 3);
        assert_eq!(store.count("sports", &[0, 1]), 1);
        assert_eq!(store.total_count("sports"), 5);
        assert_eq!(store.max_count("sports"), 3);
        assert_eq!(store.vocabulary_size("sports"), 3);
    }

    #[test]
    fn test_zero_amount_is_noop() {
        let mut store = FrequencyStore::new();
        store.increment("tech", &[4], 0);
        assert!(store.is_empty());
        assert_eq!(store.count("tech", &[4]), 0);
    }

    #[test]
    fn test_unseen_reads_are_zero() {
        let store = FrequencyStore::new();
        assert_eq!(store.count("nowhere", &[1, 2]), 0);
        assert_eq!(store.max_count("nowhere"), 0);
        assert_eq!(store.total_count("nowhere"), 0);
        assert_eq!(store.vocabulary_size("nowhere"), 0);
    }

    #[test]
    fn test_merge_sums_counts_and_removes_source() {
        let mut store = FrequencyStore::new();
        store.increment("a", &[0], 2);
        store.increment("a", &[1], 1);
        store.increment("b", &[0], 3);
        store.increment("b", &[2], 5);
        store.increment("c", &[9], 1);

        store.merge("c", "a").unwrap();
        store.merge("b", "c").unwrap();
        assert_eq!(store.count("b", &[0]), 5);
        assert_eq!(store.count("b", &[1]), 1);
        assert_eq!(store.count("b", &[2]), 5);
        assert_eq!(store.count("b", &[9]), 1);
        assert_eq!(store.total_count("b"), 12);
        assert_eq!(store.max_count("b"), 5);
        assert!(matches!(
            store.category_id("c"),
            Err(ClassifierError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_merge_unknown_category_fails() {
        let mut store = FrequencyStore::new();
        store.increment("a", &[0], 1);
        assert!(store.merge("a", "missing").is_err());
        assert!(store.merge("missing", "a").is_err());
        assert_eq!(store.count("a", &[0]), 1);
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut store = FrequencyStore::new();
        store.add_category("first").unwrap();
        store.add_category("second").unwrap();
        store.add_category("third").unwrap();
        store.increment("second", &[1], 4);

        store.rename_category("second", "middle").unwrap();
        let names: Vec<&str> = store.categories().collect();
        assert_eq!(names, vec!["first", "middle", "third"]);
        assert_eq!(store.count("middle", &[1]), 4);

        assert!(matches!(
            store.rename_category("first", "third"),
            Err(ClassifierError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn test_remove_and_duplicate() {
        let mut store = FrequencyStore::new();
        store.add_category("x").unwrap();
        assert!(store.add_category("x").is_err());
        store.remove_category("x").unwrap();
        assert!(store.remove_category("x").is_err());
    }
}
