use serde::{Deserialize, Serialize};

use super::GameRecord;

const PERCENT: f64 = 100.0;

/// Cross-round totals and the best record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub games_count: u64,
    pub best_game: GameRecord,
    pub total_correct: u64,
    pub total_questions: u64,
}

impl AggregateStats {
    /// Overall accuracy in percent; `0.0` when no question has been answered.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        accuracy(self.total_correct, self.total_questions)
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn accuracy(correct: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * PERCENT
}
