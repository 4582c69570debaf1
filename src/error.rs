// File: src/error.rs
use thiserror::Error;

/// Errors surfaced by the classifier. Missing data (unseen tokens or
/// categories in read paths) is never an error; only structural misuse is.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("document produced no tokens")]
    EmptyDocument,

    #[error("invalid value {value} for {name}: {reason}")]
    InvalidHyperparameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid maximum n-gram length {0}: must be at least 1")]
    InvalidNgramLength(usize),

    #[error("model has no categories")]
    UntrainedModel,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for ClassifierError {
    fn from(err: bincode::Error) -> Self {
        ClassifierError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ClassifierError {
    fn from(err: toml::de::Error) -> Self {
        ClassifierError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
