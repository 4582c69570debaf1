// File: src/persistence.rs
use crate::core::engine::Classifier;
use crate::core::frequency::FrequencyStore;
use crate::core::types::{DecisionPolicy, Hyperparameters};
use crate::core::vocab::Vocabulary;
use crate::error::{ClassifierError, Result};
use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild an identical model. Tokens are stored as
/// words, not ids, so a snapshot does not depend on interning order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub format_version: u32,
    pub name: String,
    pub max_ngram: usize,
    pub hyperparameters: Hyperparameters,
    pub policy: DecisionPolicy,
    pub categories: Vec<CategorySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub name: String,
    pub documents: u64,
    /// (words, count), sorted by words.
    pub tokens: Vec<(Vec<String>, u64)>,
}

impl ModelSnapshot {
    pub fn capture(classifier: &Classifier) -> Self {
        let vocab = classifier.vocabulary();
        let categories = classifier
            .store()
            .tables()
            .map(|(name, table)| {
                let mut tokens: Vec<(Vec<String>, u64)> = table
                    .tokens()
                    .map(|(token, count)| (vocab.words_of(token), count))
                    .collect();
                tokens.sort();
                CategorySnapshot {
                    name: name.to_string(),
                    documents: table.documents(),
                    tokens,
                }
            })
            .collect();

        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            name: classifier.name().to_string(),
            max_ngram: classifier.max_ngram(),
            hyperparameters: classifier.hyperparameters(),
            policy: classifier.policy(),
            categories,
        }
    }

    /// Rebuilds the model; aggregates are recomputed by re-incrementing.
    pub fn restore(&self) -> Result<Classifier> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(ClassifierError::Serialization(format!(
                "unsupported snapshot format version {}",
                self.format_version
            )));
        }
        let mut vocab = Vocabulary::new();
        let mut store = FrequencyStore::new();
        for category in &self.categories {
            let id = store.add_category(&category.name)?;
            for (words, count) in &category.tokens {
                if words.is_empty() || words.len() > self.max_ngram {
                    return Err(ClassifierError::Serialization(format!(
                        "category '{}' holds a {}-word token, expected 1..={}",
                        category.name,
                        words.len(),
                        self.max_ngram
                    )));
                }
                let ids: Vec<_> = words.iter().map(|w| vocab.get_or_intern(w)).collect();
                store.increment_at(id, &ids, *count);
            }
            store.record_documents(id, category.documents);
        }
        Classifier::from_parts(
            self.name.clone(),
            self.max_ngram,
            self.hyperparameters,
            self.policy,
            vocab,
            store,
        )
    }
}

/// Fixed-width integers, and reads bounded by the file size so a corrupt
/// length prefix fails instead of allocating.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Writes through a temp file beside `path`, then atomically moves it into place.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Saves the model as bincode.
pub fn save_to_disk(classifier: &Classifier, path: &Path) -> Result<()> {
    let snapshot = ModelSnapshot::capture(classifier);
    write_atomically(path, |writer| {
        bincode_options().serialize_into(writer, &snapshot)?;
        Ok(())
    })?;
    tracing::info!("saved model '{}' to {}", snapshot.name, path.display());
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<Classifier> {
    let file = File::open(path)?;
    let limit = file.metadata()?.len();
    let reader = BufReader::new(file);
    let snapshot: ModelSnapshot = bincode_options().with_limit(limit).deserialize_from(reader)?;
    let classifier = snapshot.restore()?;
    tracing::info!("loaded model '{}' from {}", classifier.name(), path.display());
    Ok(classifier)
}

/// Saves the model as pretty-printed JSON.
pub fn save_json(classifier: &Classifier, path: &Path) -> Result<()> {
    let snapshot = ModelSnapshot::capture(classifier);
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    })?;
    tracing::info!("saved model '{}' to {}", snapshot.name, path.display());
    Ok(())
}

pub fn load_json(path: &Path) -> Result<Classifier> {
    let reader = BufReader::new(File::open(path)?);
    let snapshot: ModelSnapshot = serde_json::from_reader(reader)?;
    snapshot.restore()
}
