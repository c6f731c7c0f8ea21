use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameRecordError {
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Result of one finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    correct: u32,
    total: u32,
    date: DateTime<Utc>,
}

impl GameRecord {
    /// # Errors
    ///
    /// Returns `GameRecordError::CorrectExceedsTotal` if `correct > total`.
    pub fn new(correct: u32, total: u32, date: DateTime<Utc>) -> Result<Self, GameRecordError> {
        if correct > total {
            return Err(GameRecordError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            date,
        })
    }

    /// The record used before any round has been played.
    #[must_use]
    pub fn empty(date: DateTime<Utc>) -> Self {
        Self {
            correct: 0,
            total: 0,
            date,
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Best-record ordering: only a strictly higher correct count wins.
    ///
    /// The ratio is not considered, so 5/10 does not beat an earlier 5/5 and
    /// 6/20 does beat 5/5.
    #[must_use]
    pub fn beats(&self, other: &GameRecord) -> bool {
        self.correct > other.correct
    }
}
