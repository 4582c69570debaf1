// File: src/core/scanner.rs
use crate::core::confidence::ConfidenceEngine;
use crate::core::types::WordId;
use serde::{Deserialize, Serialize};

/// A closed window: the words `start..start + len` recognized as one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub len: usize,
    /// Sanctioned global value of the window for every category.
    pub scores: Vec<f64>,
}

impl Segment {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn best_score(&self) -> f64 {
        max_score(&self.scores)
    }
}

/// Outcome of scanning one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Sum of every segment's scores, per category.
    pub totals: Vec<f64>,
    pub segments: Vec<Segment>,
}

enum ScanState {
    Idle,
    Extending {
        start: usize,
        len: usize,
        scores: Vec<f64>,
        best: f64,
    },
}

/// Greedy dynamic n-gram recognizer. Holds no model state of its own; the
/// only buffer it keeps is the current window (at most `max_ngram` ids).
pub struct NgramScanner<'a> {
    engine: ConfidenceEngine<'a>,
    max_ngram: usize,
    window: Vec<WordId>,
}

impl<'a> NgramScanner<'a> {
    pub fn new(engine: ConfidenceEngine<'a>, max_ngram: usize) -> Self {
        let max_ngram = max_ngram.max(1);
        Self {
            engine,
            max_ngram,
            window: Vec::with_capacity(max_ngram),
        }
    }

    /// Scans `words` (ids, `None` for out-of-vocabulary words).
    ///
    /// A window grows by one word only while the best category score of the
    /// longer window strictly beats the current one; otherwise the window is
    /// closed and scanning resumes at the first word it did not take.
    pub fn scan(&mut self, words: &[Option<WordId>]) -> ScanResult {
        let categories = self.engine.category_count();
        let mut result = ScanResult {
            totals: vec![0.0; categories],
            segments: Vec::new(),
        };
        let mut next = 0;
        let mut state = ScanState::Idle;

        loop {
            state = match state {
                ScanState::Idle => {
                    if next >= words.len() {
                        break;
                    }
                    let scores = self.window_scores(&words[next..next + 1]);
                    ScanState::Extending {
                        start: next,
                        len: 1,
                        best: max_score(&scores),
                        scores,
                    }
                }
                ScanState::Extending {
                    start,
                    len,
                    scores,
                    best,
                } => {
                    let end = start + len;
                    let accepted = if len < self.max_ngram && end < words.len() {
                        let extended = self.window_scores(&words[start..end + 1]);
                        let extended_best = max_score(&extended);
                        (extended_best > best).then_some((extended, extended_best))
                    } else {
                        None
                    };
                    match accepted {
                        Some((extended, extended_best)) => ScanState::Extending {
                            start,
                            len: len + 1,
                            scores: extended,
                            best: extended_best,
                        },
                        None => {
                            for (total, s) in result.totals.iter_mut().zip(&scores) {
                                *total += s;
                            }
                            result.segments.push(Segment { start, len, scores });
                            next = end;
                            ScanState::Idle
                        }
                    }
                }
            };
        }
        result
    }

    fn window_scores(&mut self, words: &[Option<WordId>]) -> Vec<f64> {
        self.window.clear();
        for word in words {
            match word {
                Some(id) => self.window.push(*id),
                // An unknown word can't be part of any learned token.
                None => return vec![0.0; self.engine.category_count()],
            }
        }
        self.engine.sanctioned_values(&self.window)
    }
}

fn max_score(scores: &[f64]) -> f64 {
    scores.iter().copied().fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frequency::FrequencyStore;
    use crate::core::types::Hyperparameters;

    fn store() -> FrequencyStore {
        // words: 0 = new, 1 = york, 2 = city, 3 = the
        let mut store = FrequencyStore::new();
        for _ in 0..4 {
            store.increment("travel", &[0, 1], 1);
            store.increment("travel", &[0], 1);
            store.increment("travel", &[1], 1);
        }
        store.increment("travel", &[3], 4);
        store.increment("food", &[3], 4);
        store.increment("food", &[0], 1);
        store.increment("food", &[1], 4);
        store.increment("food", &[2], 4);
        store.increment("tech", &[3], 4);
        store.increment("tech", &[2], 2);
        store
    }

    #[test]
    fn test_empty_document() {
        let store = store();
        let engine = ConfidenceEngine::new(&store, Hyperparameters::default());
        let result = NgramScanner::new(engine, 3).scan(&[]);
        assert!(result.segments.is_empty());
        assert_eq!(result.totals, vec![0.0; 3]);
    }

    #[test]
    fn test_segments_cover_every_word_once() {
        let store = store();
        let engine = ConfidenceEngine::new(&store, Hyperparameters::default());
        let words = [Some(3), Some(0), Some(1), None, Some(2), Some(3)];
        let result = NgramScanner::new(engine, 3).scan(&words);

        let mut next = 0;
        for segment in &result.segments {
            assert_eq!(segment.start, next);
            assert!(segment.len >= 1 && segment.len <= 3);
            next = segment.end();
        }
        assert_eq!(next, words.len());
    }

    #[test]
    fn test_extends_when_bigram_is_stronger() {
        let store = store();
        let engine = ConfidenceEngine::new(&store, Hyperparameters::default());
        let single = engine.sanctioned_values(&[0]);
        let pair = engine.sanctioned_values(&[0, 1]);
        assert!(max_score(&pair) > max_score(&single));

        let result = NgramScanner::new(engine, 2).scan(&[Some(0), Some(1)]);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].len, 2);
        assert_eq!(result.totals, pair);
    }

    #[test]
    fn test_unigram_limit_never_extends() {
        let store = store();
        let engine = ConfidenceEngine::new(&store, Hyperparameters::default());
        let result = NgramScanner::new(engine, 1).scan(&[Some(0), Some(1)]);
        assert_eq!(result.segments.len(), 2);
        assert!(result.segments.iter().all(|s| s.len == 1));
    }

    #[test]
    fn test_unknown_words_contribute_nothing() {
        let store = store();
        let engine = ConfidenceEngine::new(&store, Hyperparameters::default());
        let result = NgramScanner::new(engine, 3).scan(&[None, None]);
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.totals, vec![0.0; 3]);
    }
}
