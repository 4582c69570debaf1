// src/core/types.rs
use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};

/// A unique identifier for an interned word.
pub type WordId = usize;

/// Position of a category in the model's insertion order.
pub type CategoryId = usize;

/// An n-gram of 1..=N interned words. Unigrams and longer n-grams share
/// this one representation so every category table has a single key space.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token(Vec<WordId>);

impl Token {
    pub fn new(words: Vec<WordId>) -> Self {
        Self(words)
    }

    pub fn from_slice(words: &[WordId]) -> Self {
        Self(words.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn words(&self) -> &[WordId] {
        &self.0
    }
}

// Must hash exactly like the borrowed slice so `HashMap<Token, _>` can be
// queried with `&[WordId]` windows.
impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_slice().hash(state);
    }
}

impl Borrow<[WordId]> for Token {
    fn borrow(&self) -> &[WordId] {
        &self.0
    }
}

pub const DEFAULT_SMOOTHNESS: f64 = 0.45;
pub const DEFAULT_SIGNIFICANCE: f64 = 0.5;
pub const DEFAULT_SANCTION: f64 = 1.0;

/// The (smoothness, significance, sanction) triple. Pure metadata: changing
/// it never touches learned frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Smoothness `s` in [0, 1].
    pub s: f64,
    /// Significance `l` >= 0.
    pub l: f64,
    /// Sanction `p` >= 0.
    pub p: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            s: DEFAULT_SMOOTHNESS,
            l: DEFAULT_SIGNIFICANCE,
            p: DEFAULT_SANCTION,
        }
    }
}

impl Hyperparameters {
    /// Builds a validated triple.
    pub fn new(s: f64, l: f64, p: f64) -> Result<Self> {
        let params = Self { s, l, p };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.s.is_finite() || !(0.0..=1.0).contains(&self.s) {
            return Err(ClassifierError::InvalidHyperparameter {
                name: "smoothness",
                value: self.s,
                reason: "must lie in [0, 1]",
            });
        }
        if !self.l.is_finite() || self.l < 0.0 {
            return Err(ClassifierError::InvalidHyperparameter {
                name: "significance",
                value: self.l,
                reason: "must be a finite value >= 0",
            });
        }
        if !self.p.is_finite() || self.p < 0.0 {
            return Err(ClassifierError::InvalidHyperparameter {
                name: "sanction",
                value: self.p,
                reason: "must be a finite value >= 0",
            });
        }
        Ok(())
    }
}

/// How a confidence vector is turned into predicted labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// Argmax; the earliest inserted category wins ties.
    #[default]
    SingleLabel,
    /// Every category scoring at least `cutoff * top` (and above zero).
    MultiLabel { cutoff: f64 },
}

impl DecisionPolicy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            DecisionPolicy::SingleLabel => Ok(()),
            DecisionPolicy::MultiLabel { cutoff } => {
                if cutoff.is_finite() && cutoff > 0.0 && cutoff <= 1.0 {
                    Ok(())
                } else {
                    Err(ClassifierError::InvalidHyperparameter {
                        name: "cutoff",
                        value: cutoff,
                        reason: "must lie in (0, 1]",
                    })
                }
            }
        }
    }
}

/// Score of one category inside a confidence vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
}

/// One entry per category, in category insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceVector {
    entries: Vec<CategoryScore>,
}

impl ConfidenceVector {
    pub(crate) fn new(entries: Vec<CategoryScore>) -> Self {
        Self { entries }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScore> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.score).collect()
    }

    /// Highest scoring entry; ties go to the earliest category.
    pub fn top(&self) -> Option<&CategoryScore> {
        let mut best: Option<&CategoryScore> = None;
        for entry in &self.entries {
            match best {
                Some(b) if entry.score <= b.score => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    /// Resolves predicted labels under `policy`.
    pub fn resolve(&self, policy: DecisionPolicy) -> Vec<String> {
        let Some(top) = self.top() else {
            return Vec::new();
        };
        match policy {
            DecisionPolicy::SingleLabel => vec![top.category.clone()],
            DecisionPolicy::MultiLabel { cutoff } => {
                let threshold = top.score * cutoff;
                let mut picked: Vec<&CategoryScore> = self
                    .entries
                    .iter()
                    .filter(|e| e.score > 0.0 && e.score >= threshold)
                    .collect();
                // Stable sort keeps insertion order among equal scores.
                picked.sort_by(|a, b| b.score.total_cmp(&a.score));
                picked.into_iter().map(|e| e.category.clone()).collect()
            }
        }
    }
}

/// Result of classifying one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub confidences: ConfidenceVector,
    pub labels: Vec<String>,
}

impl Classification {
    /// True when the model had no categories to score against.
    pub fn is_untrained(&self) -> bool {
        self.confidences.is_empty()
    }

    pub fn label(&self) -> Option<&str> {
        self.labels.first().map(|s| s.as_str())
    }
}

/// Per-token confidence breakdown for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenValues {
    /// Local value.
    pub lv: f64,
    /// Significance factor.
    pub sg: f64,
    /// Global value, `lv * sg`.
    pub gv: f64,
    /// Sanction factor.
    pub sn: f64,
    /// Sanctioned global value, `gv * sn`.
    pub sgv: f64,
}

/// Aggregate figures for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub documents: u64,
    pub total_count: u64,
    pub max_count: u64,
    pub vocabulary_size: usize,
}
