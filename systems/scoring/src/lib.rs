#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score tracking system whose running and high scores persist across runs.

use merge_grid_core::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Persisted score state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Running score of the current round.
    pub score: u64,
    /// Best score observed across sessions.
    pub high_score: u64,
}

/// Failures reported by a [`ScoreStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("score store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The stored data could not be decoded.
    #[error("stored score record is malformed: {0}")]
    Malformed(String),
}

/// Key-value storage for the score record.
pub trait ScoreStore {
    /// Loads the last saved record.
    fn load(&mut self) -> Result<ScoreRecord, StoreError>;
    /// Saves `record`, replacing any previous one.
    fn save(&mut self, record: &ScoreRecord) -> Result<(), StoreError>;
}

/// In-memory store, useful for tests and sessions without persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    record: Option<ScoreRecord>,
    saves: usize,
}

impl MemoryStore {
    /// Creates a store pre-populated with `record`.
    #[must_use]
    pub const fn with_record(record: ScoreRecord) -> Self {
        Self {
            record: Some(record),
            saves: 0,
        }
    }

    /// Last saved record, if any.
    #[must_use]
    pub const fn record(&self) -> Option<ScoreRecord> {
        self.record
    }

    /// Number of successful saves.
    #[must_use]
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl ScoreStore for MemoryStore {
    fn load(&mut self) -> Result<ScoreRecord, StoreError> {
        Ok(self.record.unwrap_or_default())
    }

    fn save(&mut self, record: &ScoreRecord) -> Result<(), StoreError> {
        self.record = Some(*record);
        self.saves += 1;
        Ok(())
    }
}

/// Accumulates merge points and keeps the high score persisted.
#[derive(Debug)]
pub struct Scoring<S> {
    store: S,
    score: u64,
    high_score: u64,
}

impl<S: ScoreStore> Scoring<S> {
    /// Creates a scoring system, restoring both scores from `store`.
    ///
    /// A failing load starts from zero instead of aborting the session.
    pub fn new(mut store: S) -> Self {
        let record = store.load().unwrap_or_else(|error| {
            warn!(%error, "could not load score record, starting from zero");
            ScoreRecord::default()
        });
        Self {
            store,
            score: record.score,
            high_score: record.high_score.max(record.score),
        }
    }

    /// Running score of the current round.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Best score observed so far.
    #[must_use]
    pub const fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Current state as a persistable record.
    #[must_use]
    pub const fn record(&self) -> ScoreRecord {
        ScoreRecord {
            score: self.score,
            high_score: self.high_score,
        }
    }

    /// Shared access to the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Gives the backing store back, e.g. after a final [`Scoring::persist`].
    pub fn into_store(self) -> S {
        self.store
    }

    /// Consumes `Event::ScoreChanged` entries and announces new high scores.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        let mut raised = false;
        for event in events {
            if let Event::ScoreChanged { delta } = event {
                self.score = self.score.saturating_add(*delta);
                if self.score > self.high_score {
                    self.high_score = self.score;
                    raised = true;
                }
            }
        }

        if raised {
            info!(high_score = self.high_score, "new high score");
            out.push(Event::HighScoreRaised {
                high_score: self.high_score,
            });
            self.persist();
        }
    }

    /// Starts a new round. The high score is kept.
    pub fn reset(&mut self) {
        self.score = 0;
    }

    /// Saves the current record. Failures are logged and otherwise ignored.
    pub fn persist(&mut self) {
        let record = self.record();
        if let Err(error) = self.store.save(&record) {
            warn!(%error, "could not save score record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl ScoreStore for FailingStore {
        fn load(&mut self) -> Result<ScoreRecord, StoreError> {
            Err(StoreError::Malformed("truncated".to_owned()))
        }

        fn save(&mut self, _record: &ScoreRecord) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn loads_running_score_and_high_score() {
        let store = MemoryStore::with_record(ScoreRecord {
            score: 320,
            high_score: 900,
        });
        let scoring = Scoring::new(store);
        assert_eq!(scoring.score(), 320);
        assert_eq!(scoring.high_score(), 900);
        assert_eq!(
            scoring.record(),
            ScoreRecord {
                score: 320,
                high_score: 900,
            }
        );
    }

    #[test]
    fn stored_score_above_high_score_raises_it() {
        let scoring = Scoring::new(MemoryStore::with_record(ScoreRecord {
            score: 500,
            high_score: 100,
        }));
        assert_eq!(scoring.high_score(), 500);
    }

    #[test]
    fn failing_store_is_not_fatal() {
        let mut scoring = Scoring::new(FailingStore);
        let mut out = Vec::new();
        scoring.handle(&[Event::ScoreChanged { delta: 20 }], &mut out);
        assert_eq!(scoring.score(), 20);
        assert_eq!(scoring.high_score(), 20);
        assert_eq!(out, vec![Event::HighScoreRaised { high_score: 20 }]);
    }

    #[test]
    fn reset_keeps_high_score() {
        let mut scoring = Scoring::new(MemoryStore::default());
        let mut out = Vec::new();
        scoring.handle(&[Event::ScoreChanged { delta: 80 }], &mut out);
        scoring.reset();
        assert_eq!(scoring.score(), 0);
        assert_eq!(scoring.high_score(), 80);
    }
}
