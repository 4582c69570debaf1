//! Thread-shareable handle for models that are trained and queried at the
//! same time. Training holds the write lock for one document at a time;
//! classification runs under the read lock against a consistent state.

use crate::core::engine::Classifier;
use crate::core::types::{Classification, Hyperparameters};
use crate::error::Result;
use crate::learning::LearnReport;
use crate::persistence::ModelSnapshot;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct SharedClassifier {
    inner: Arc<RwLock<Classifier>>,
}

impl SharedClassifier {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            inner: Arc::new(RwLock::new(classifier)),
        }
    }

    // Every mutation finishes before its guard drops, so a poisoned lock
    // still guards a consistent model.
    fn read(&self) -> RwLockReadGuard<'_, Classifier> {
        self.inner.read().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering poisoned classifier lock");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Classifier> {
        self.inner.write().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering poisoned classifier lock");
            poisoned.into_inner()
        })
    }

    pub fn train(&self, document: &str, category: &str) -> Result<LearnReport> {
        self.write().train(document, category)
    }

    pub fn set_hyperparameters(&self, s: f64, l: f64, p: f64) -> Result<()> {
        self.write().set_hyperparameters(s, l, p)
    }

    pub fn hyperparameters(&self) -> Hyperparameters {
        self.read().hyperparameters()
    }

    pub fn classify(&self, document: &str) -> Result<Classification> {
        self.read().classify(document)
    }

    pub fn classify_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Vec<Result<Classification>> {
        self.read().classify_batch(documents)
    }

    /// A detached copy of the current model.
    pub fn cloned(&self) -> Classifier {
        self.read().clone()
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot::capture(&self.read())
    }

    /// Runs `f` with shared access to the model.
    pub fn with<R>(&self, f: impl FnOnce(&Classifier) -> R) -> R {
        f(&self.read())
    }

    /// Runs `f` with exclusive access to the model.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Classifier) -> R) -> R {
        f(&mut self.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_train_and_classify() {
        let shared = SharedClassifier::new(Classifier::new("shared", 2).unwrap());
        shared.train("warm up", "a").unwrap();

        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let category = if i % 2 == 0 { "a" } else { "b" };
                    shared.train("alpha beta gamma", category).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let result = shared.classify("alpha beta").unwrap();
                        assert!(!result.labels.is_empty());
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        let docs = shared.with(|c| c.category_stats("a").unwrap().documents);
        assert_eq!(docs, 26);
    }
}
