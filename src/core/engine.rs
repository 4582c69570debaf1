use crate::config::ClassifierConfig;
use crate::core::confidence::ConfidenceEngine;
use crate::core::frequency::FrequencyStore;
use crate::core::scanner::{NgramScanner, ScanResult};
use crate::core::tokenizer::{Tokenizer, WordTokenizer};
use crate::core::types::{
    CategoryScore, CategoryStats, Classification, ConfidenceVector, DecisionPolicy,
    Hyperparameters, TokenValues,
};
use crate::core::vocab::Vocabulary;
use crate::error::{ClassifierError, Result};
use crate::learning::{LearnReport, LearningEngine, TrainingExample};
use rayon::prelude::*;
use std::sync::Arc;

/// A trained (or trainable) model: categories, their frequency tables, the
/// hyperparameter triple and the decision policy.
///
/// Training takes `&mut self`, so a model has one writer at a time.
/// Classification only reads and can run from many threads at once.
#[derive(Debug, Clone)]
pub struct Classifier {
    name: String,
    max_ngram: usize,
    params: Hyperparameters,
    policy: DecisionPolicy,
    vocab: Vocabulary,
    store: FrequencyStore,
    tokenizer: Arc<dyn Tokenizer>,
    learning_engine: LearningEngine,
}

impl Classifier {
    pub fn new(name: &str, max_ngram: usize) -> Result<Self> {
        if max_ngram == 0 {
            return Err(ClassifierError::InvalidNgramLength(max_ngram));
        }
        Ok(Self {
            name: name.to_string(),
            max_ngram,
            params: Hyperparameters::default(),
            policy: DecisionPolicy::default(),
            vocab: Vocabulary::new(),
            store: FrequencyStore::new(),
            tokenizer: Arc::new(WordTokenizer::default()),
            learning_engine: LearningEngine::new(),
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;
        let mut classifier = Self::new(&config.name, config.max_ngram)?;
        classifier.params = config.hyperparameters;
        classifier.policy = config.policy;
        classifier.tokenizer = Arc::new(WordTokenizer::new(config.tokenizer.clone()));
        Ok(classifier)
    }

    /// Replaces the tokenizer used by the text-based entry points.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub(crate) fn from_parts(
        name: String,
        max_ngram: usize,
        params: Hyperparameters,
        policy: DecisionPolicy,
        vocab: Vocabulary,
        store: FrequencyStore,
    ) -> Result<Self> {
        params.validate()?;
        policy.validate()?;
        let mut classifier = Self::new(&name, max_ngram)?;
        classifier.params = params;
        classifier.policy = policy;
        classifier.vocab = vocab;
        classifier.store = store;
        Ok(classifier)
    }

    // --- model metadata ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// A full, independent copy of this model under another name.
    pub fn clone_as(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.name = name.to_string();
        copy
    }

    pub fn max_ngram(&self) -> usize {
        self.max_ngram
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        self.params
    }

    /// Validates and installs a new (s, l, p) triple. Learned frequencies
    /// are left untouched.
    pub fn set_hyperparameters(&mut self, s: f64, l: f64, p: f64) -> Result<()> {
        self.params = Hyperparameters::new(s, l, p)?;
        Ok(())
    }

    pub fn set_params(&mut self, params: Hyperparameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DecisionPolicy) -> Result<()> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn store(&self) -> &FrequencyStore {
        &self.store
    }

    pub fn confidence(&self) -> ConfidenceEngine<'_> {
        ConfidenceEngine::new(&self.store, self.params)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    // --- categories ---

    pub fn categories(&self) -> Vec<&str> {
        self.store.categories().collect()
    }

    pub fn category_count(&self) -> usize {
        self.store.len()
    }

    pub fn add_category(&mut self, category: &str) -> Result<()> {
        self.store.add_category(category).map(|_| ())
    }

    pub fn remove_category(&mut self, category: &str) -> Result<()> {
        self.store.remove_category(category)
    }

    pub fn rename_category(&mut self, from: &str, to: &str) -> Result<()> {
        self.store.rename_category(from, to)
    }

    /// Moves everything learned for `source` into `target` and drops `source`.
    pub fn merge_categories(&mut self, target: &str, source: &str) -> Result<()> {
        self.store.merge(target, source)
    }

    pub fn category_stats(&self, category: &str) -> Result<CategoryStats> {
        self.store.table_by_name(category).map(|t| t.stats())
    }

    /// The category that saw the most training documents.
    pub fn most_probable_category(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (name, table) in self.store.tables() {
            match best {
                Some((_, docs)) if table.documents() <= docs => {}
                _ => best = Some((name, table.documents())),
            }
        }
        best.map(|(name, _)| name)
    }

    /// Fails with `UntrainedModel` when there is nothing to classify against.
    pub fn ensure_trained(&self) -> Result<()> {
        if self.store.is_empty() {
            Err(ClassifierError::UntrainedModel)
        } else {
            Ok(())
        }
    }

    // --- training ---

    pub fn train(&mut self, document: &str, category: &str) -> Result<LearnReport> {
        let words = self.tokenizer.tokenize(document);
        self.train_tokens(&words, category)
    }

    pub fn train_tokens<S: AsRef<str>>(&mut self, words: &[S], category: &str) -> Result<LearnReport> {
        self.learning_engine.learn(
            &mut self.vocab,
            &mut self.store,
            self.max_ngram,
            &TrainingExample { words, category },
        )
    }

    /// Trains on every `(document, category)` pair in order. Stops at the
    /// first failing document.
    pub fn fit<I, D, C>(&mut self, corpus: I) -> Result<usize>
    where
        I: IntoIterator<Item = (D, C)>,
        D: AsRef<str>,
        C: AsRef<str>,
    {
        let mut documents = 0;
        for (document, category) in corpus {
            self.train(document.as_ref(), category.as_ref())?;
            documents += 1;
        }
        tracing::info!(
            "model '{}' learned {} documents across {} categories",
            self.name,
            documents,
            self.store.len()
        );
        Ok(documents)
    }

    // --- classification ---

    pub fn scan(&self, document: &str) -> ScanResult {
        let words = self.tokenizer.tokenize(document);
        self.scan_tokens(&words)
    }

    pub fn scan_tokens<S: AsRef<str>>(&self, words: &[S]) -> ScanResult {
        let ids = self.vocab.lookup_all(words);
        NgramScanner::new(self.confidence(), self.max_ngram).scan(&ids)
    }

    /// Scores `document` against every category and resolves labels with
    /// the current decision policy. A model without categories yields an
    /// empty result rather than an error.
    pub fn classify(&self, document: &str) -> Result<Classification> {
        let words = self.tokenizer.tokenize(document);
        self.classify_tokens(&words)
    }

    pub fn classify_tokens<S: AsRef<str>>(&self, words: &[S]) -> Result<Classification> {
        if self.store.is_empty() {
            return Ok(Classification {
                confidences: ConfidenceVector::default(),
                labels: Vec::new(),
            });
        }
        if words.is_empty() {
            return Err(ClassifierError::EmptyDocument);
        }
        let scan = self.scan_tokens(words);
        let confidences = ConfidenceVector::new(
            self.store
                .categories()
                .zip(scan.totals)
                .map(|(category, score)| CategoryScore {
                    category: category.to_string(),
                    score,
                })
                .collect(),
        );
        let labels = confidences.resolve(self.policy);
        Ok(Classification {
            confidences,
            labels,
        })
    }

    /// Classifies documents independently and in parallel. Output order
    /// matches input order; one bad document does not affect the others.
    pub fn classify_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Vec<Result<Classification>> {
        documents
            .par_iter()
            .map(|d| self.classify(d.as_ref()))
            .collect()
    }

    // --- inspection ---

    /// lv/sg/gv/sn/sgv of a phrase in one category. Unseen phrases score 0.
    pub fn token_values(&self, phrase: &str, category: &str) -> Result<TokenValues> {
        let category_id = self.store.category_id(category)?;
        Ok(self
            .token_breakdown(phrase)
            .into_iter()
            .nth(category_id)
            .map(|(_, values)| values)
            .unwrap_or_default())
    }

    /// The phrase's breakdown for every category, in category order.
    pub fn token_breakdown(&self, phrase: &str) -> Vec<(String, TokenValues)> {
        let words = self.tokenizer.tokenize(phrase);
        let values = match self.vocab.token_for(&words) {
            Some(token) if !token.is_empty() => self.confidence().breakdown(token.words()),
            _ => vec![TokenValues::default(); self.store.len()],
        };
        self.store
            .categories()
            .map(str::to_string)
            .zip(values)
            .collect()
    }
}
