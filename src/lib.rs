// src/lib.rs
//! Supervised text classifier that learns a frequency-based language model
//! per category and classifies documents by greedily growing recognized
//! word sequences (unigram to n-gram) while accumulating per-category
//! confidence.
//!
//! ```
//! use ss3_core::Classifier;
//!
//! let mut clf = Classifier::new("topics", 2)?;
//! clf.train("soccer match", "sports")?;
//! clf.train("neural network", "tech")?;
//!
//! let result = clf.classify("a soccer match tonight")?;
//! assert_eq!(result.label(), Some("sports"));
//! # Ok::<(), ss3_core::ClassifierError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod inspect;
pub mod learning;
pub mod persistence;
pub mod shared;

pub use crate::config::ClassifierConfig;
pub use crate::core::engine::Classifier;
pub use crate::core::scanner::{ScanResult, Segment};
pub use crate::core::tokenizer::{Tokenizer, TokenizerOptions, WordTokenizer};
pub use crate::core::types::{
    Classification, ConfidenceVector, DecisionPolicy, Hyperparameters, TokenValues,
};
pub use crate::error::{ClassifierError, Result};
pub use crate::inspect::VocabularyEntry;
pub use crate::persistence::{load_from_disk, save_to_disk, ModelSnapshot};
pub use crate::shared::SharedClassifier;
