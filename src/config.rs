//! Classifier configuration
//!
//! Values are layered, later sources winning:
//! 1. Built-in defaults
//! 2. A TOML file (`ClassifierConfig::load`)
//! 3. Environment variables `SS3_S`, `SS3_L`, `SS3_P`, `SS3_MAX_NGRAM`

use crate::core::tokenizer::TokenizerOptions;
use crate::core::types::{DecisionPolicy, Hyperparameters};
use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_NGRAM: usize = 3;
pub const DEFAULT_MODEL_NAME: &str = "ss3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub name: String,
    pub max_ngram: usize,
    pub hyperparameters: Hyperparameters,
    pub policy: DecisionPolicy,
    pub tokenizer: TokenizerOptions,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            max_ngram: DEFAULT_MAX_NGRAM,
            hyperparameters: Hyperparameters::default(),
            policy: DecisionPolicy::default(),
            tokenizer: TokenizerOptions::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClassifierConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env()?;
        tracing::debug!("loaded classifier config from {}", path.display());
        Ok(config)
    }

    /// Environment variables override everything.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SS3_S") {
            self.hyperparameters.s = parse_number("SS3_S", &v)?;
        }
        if let Some(v) = lookup("SS3_L") {
            self.hyperparameters.l = parse_number("SS3_L", &v)?;
        }
        if let Some(v) = lookup("SS3_P") {
            self.hyperparameters.p = parse_number("SS3_P", &v)?;
        }
        if let Some(v) = lookup("SS3_MAX_NGRAM") {
            self.max_ngram = v
                .trim()
                .parse()
                .map_err(|_| ClassifierError::Config(format!("SS3_MAX_NGRAM: invalid value '{}'", v)))?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_ngram == 0 {
            return Err(ClassifierError::InvalidNgramLength(self.max_ngram));
        }
        self.hyperparameters.validate()?;
        self.policy.validate()
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| ClassifierError::Config(format!("{}: invalid value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.max_ngram, 3);
        assert_eq!(config.hyperparameters, Hyperparameters::default());
        assert_eq!(config.policy, DecisionPolicy::SingleLabel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = ClassifierConfig::from_toml_str(
            r#"
            name = "topics"
            max_ngram = 2

            [hyperparameters]
            s = 0.32
            l = 1.24
            p = 1.1

            [policy.multi_label]
            cutoff = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "topics");
        assert_eq!(config.max_ngram, 2);
        assert_eq!(config.hyperparameters.l, 1.24);
        assert_eq!(config.policy, DecisionPolicy::MultiLabel { cutoff: 0.6 });
        assert!(config.tokenizer.lowercase);
    }

    #[test]
    fn test_invalid_toml_values() {
        let err = ClassifierConfig::from_toml_str("max_ngram = 0").unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidNgramLength(0)));

        let err = ClassifierConfig::from_toml_str("[hyperparameters]\ns = 2.0\nl = 0.5\np = 1.0")
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidHyperparameter { .. }));

        let err = ClassifierConfig::from_toml_str("max_ngram = \"three\"").unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("SS3_L", "0.9"), ("SS3_MAX_NGRAM", "4")].into();
        let mut config = ClassifierConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.hyperparameters.l, 0.9);
        assert_eq!(config.max_ngram, 4);
        assert_eq!(config.hyperparameters.s, 0.45);

        let bad: HashMap<&str, &str> = [("SS3_P", "lots")].into();
        let mut config = ClassifierConfig::default();
        assert!(config
            .apply_overrides(|k| bad.get(k).map(|v| v.to_string()))
            .is_err());
    }
}
