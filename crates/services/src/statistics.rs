use std::sync::Arc;

use chrono::{DateTime, Utc};
use quiz_core::Clock;
use quiz_core::model::{AggregateStats, GameRecord};
use storage::repository::{KeyValueRepository, StorageError, StoredValue};
use tracing::warn;

use crate::error::StatisticsError;

mod keys {
    pub const GAMES_COUNT: &str = "gamesCount";
    pub const BEST_CORRECT: &str = "bestCorrect";
    pub const BEST_TOTAL: &str = "bestTotal";
    pub const BEST_DATE: &str = "bestDate";
    pub const TOTAL_CORRECT: &str = "totalCorrect";
    pub const TOTAL_QUESTIONS: &str = "totalQuestions";

    pub const ALL: [&str; 6] = [
        GAMES_COUNT,
        BEST_CORRECT,
        BEST_TOTAL,
        BEST_DATE,
        TOTAL_CORRECT,
        TOTAL_QUESTIONS,
    ];
}

fn to_stored(field: &'static str, value: u64) -> Result<StoredValue, StorageError> {
    i64::try_from(value)
        .map(StoredValue::Integer)
        .map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

/// Aggregate game statistics persisted across runs.
///
/// Writes are best-effort: `store` never fails, storage problems are logged
/// and the round is simply not counted. Reads fall back to zero values.
#[derive(Clone)]
pub struct StatisticsStore {
    clock: Clock,
    values: Arc<dyn KeyValueRepository>,
}

impl StatisticsStore {
    #[must_use]
    pub fn new(clock: Clock, values: Arc<dyn KeyValueRepository>) -> Self {
        Self { clock, values }
    }

    /// Record a finished round.
    ///
    /// The best game is replaced only when `correct` is strictly greater than
    /// the stored best, regardless of `total`.
    pub async fn store(&self, correct: u32, total: u32) {
        let record = match GameRecord::new(correct, total, self.clock.now()) {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "ignoring invalid round result");
                return;
            }
        };
        if let Err(err) = self.try_store(record).await {
            warn!(%err, correct, total, "failed to persist round statistics");
        }
    }

    async fn try_store(&self, record: GameRecord) -> Result<(), StorageError> {
        let games_count = self.read_count(keys::GAMES_COUNT).await?;
        let total_correct = self.read_count(keys::TOTAL_CORRECT).await?;
        let total_questions = self.read_count(keys::TOTAL_QUESTIONS).await?;
        let best_correct = self.read_count(keys::BEST_CORRECT).await?;

        let mut entries = vec![
            (
                keys::GAMES_COUNT,
                to_stored("gamesCount", games_count.saturating_add(1))?,
            ),
            (
                keys::TOTAL_CORRECT,
                to_stored(
                    "totalCorrect",
                    total_correct.saturating_add(u64::from(record.correct())),
                )?,
            ),
            (
                keys::TOTAL_QUESTIONS,
                to_stored(
                    "totalQuestions",
                    total_questions.saturating_add(u64::from(record.total())),
                )?,
            ),
        ];

        if u64::from(record.correct()) > best_correct {
            entries.push((keys::BEST_CORRECT, StoredValue::Integer(record.correct().into())));
            entries.push((keys::BEST_TOTAL, StoredValue::Integer(record.total().into())));
            entries.push((keys::BEST_DATE, StoredValue::Timestamp(record.date())));
        }

        self.values.put_values(&entries).await
    }

    /// Number of recorded rounds.
    pub async fn games_count(&self) -> u64 {
        self.count_or_zero(keys::GAMES_COUNT).await
    }

    /// Best round so far; `{0, 0, now}` before the first round.
    pub async fn best_game(&self) -> GameRecord {
        match self.read_best_game().await {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "failed to read best game");
                GameRecord::empty(self.clock.now())
            }
        }
    }

    /// Percentage of correct answers over all rounds; `0.0` before any question.
    pub async fn total_accuracy(&self) -> f64 {
        self.snapshot().await.accuracy()
    }

    /// All aggregate values at once.
    pub async fn snapshot(&self) -> AggregateStats {
        AggregateStats {
            games_count: self.games_count().await,
            best_game: self.best_game().await,
            total_correct: self.count_or_zero(keys::TOTAL_CORRECT).await,
            total_questions: self.count_or_zero(keys::TOTAL_QUESTIONS).await,
        }
    }

    /// Wipe all statistics.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` if the keys cannot be removed.
    pub async fn reset(&self) -> Result<(), StatisticsError> {
        self.values.remove_values(&keys::ALL).await?;
        Ok(())
    }

    async fn read_best_game(&self) -> Result<GameRecord, StorageError> {
        let correct = self.read_u32(keys::BEST_CORRECT).await?;
        let total = self.read_u32(keys::BEST_TOTAL).await?;
        let date = self
            .read_timestamp(keys::BEST_DATE)
            .await?
            .unwrap_or_else(|| self.clock.now());
        GameRecord::new(correct, total, date)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn count_or_zero(&self, key: &'static str) -> u64 {
        match self.read_count(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, key, "failed to read statistics counter");
                0
            }
        }
    }

    async fn read_count(&self, key: &'static str) -> Result<u64, StorageError> {
        match self.values.get_value(key).await? {
            None => Ok(0),
            Some(StoredValue::Integer(v)) => u64::try_from(v)
                .map_err(|_| StorageError::Serialization(format!("negative {key}: {v}"))),
            Some(StoredValue::Timestamp(_)) => Err(StorageError::Serialization(format!(
                "{key} holds a timestamp"
            ))),
        }
    }

    async fn read_u32(&self, key: &'static str) -> Result<u32, StorageError> {
        let value = self.read_count(key).await?;
        u32::try_from(value)
            .map_err(|_| StorageError::Serialization(format!("{key} overflow: {value}")))
    }

    async fn read_timestamp(
        &self,
        key: &'static str,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        match self.values.get_value(key).await? {
            None => Ok(None),
            Some(StoredValue::Timestamp(t)) => Ok(Some(t)),
            Some(StoredValue::Integer(_)) => Err(StorageError::Serialization(format!(
                "{key} holds an integer"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn store_with(repo: &InMemoryRepository) -> StatisticsStore {
        StatisticsStore::new(fixed_clock(), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn fresh_store_reads_defaults() {
        let stats = store_with(&InMemoryRepository::new());
        assert_eq!(stats.games_count().await, 0);
        assert_eq!(stats.best_game().await, GameRecord::empty(fixed_now()));
        assert!(stats.total_accuracy().await.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn first_round_becomes_best_game() {
        let stats = store_with(&InMemoryRepository::new());
        stats.store(5, 10).await;

        assert_eq!(stats.games_count().await, 1);
        assert_eq!(
            stats.best_game().await,
            GameRecord::new(5, 10, fixed_now()).unwrap()
        );
        assert!((stats.total_accuracy().await - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn accumulates_totals_over_rounds() {
        let stats = store_with(&InMemoryRepository::new());
        let rounds = [(3_u32, 10_u32), (0, 10), (10, 10), (7, 9)];
        for (correct, total) in rounds {
            stats.store(correct, total).await;
        }

        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.games_count, 4);
        assert_eq!(snapshot.total_correct, 20);
        assert_eq!(snapshot.total_questions, 39);
        let expected = 20.0 / 39.0 * 100.0;
        assert!((snapshot.accuracy() - expected).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&snapshot.accuracy()));
    }

    #[tokio::test]
    async fn tie_does_not_replace_best_game() {
        let repo = InMemoryRepository::new();
        let mut clock = fixed_clock();
        let first = StatisticsStore::new(clock, Arc::new(repo.clone()));
        first.store(5, 5).await;

        clock.advance(Duration::days(1));
        let later = StatisticsStore::new(clock, Arc::new(repo.clone()));
        later.store(5, 10).await;
        assert_eq!(
            later.best_game().await,
            GameRecord::new(5, 5, fixed_now()).unwrap()
        );

        later.store(6, 20).await;
        assert_eq!(
            later.best_game().await,
            GameRecord::new(6, 20, fixed_now() + Duration::days(1)).unwrap()
        );
    }

    #[tokio::test]
    async fn invalid_round_is_ignored() {
        let stats = store_with(&InMemoryRepository::new());
        stats.store(4, 3).await;
        assert_eq!(stats.games_count().await, 0);
    }

    #[tokio::test]
    async fn reset_wipes_everything() {
        let repo = InMemoryRepository::new();
        let stats = store_with(&repo);
        stats.store(8, 10).await;
        stats.reset().await.unwrap();
        assert!(repo.is_empty());
        assert_eq!(stats.games_count().await, 0);
    }

    struct FailingRepository;

    #[async_trait]
    impl KeyValueRepository for FailingRepository {
        async fn get_value(&self, _key: &str) -> Result<Option<StoredValue>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn put_values(&self, _entries: &[(&str, StoredValue)]) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn remove_values(&self, _keys: &[&str]) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    #[tokio::test]
    async fn storage_failures_are_swallowed() {
        let stats = StatisticsStore::new(fixed_clock(), Arc::new(FailingRepository));
        stats.store(3, 10).await;
        assert_eq!(stats.games_count().await, 0);
        assert_eq!(stats.best_game().await, GameRecord::empty(fixed_now()));
        assert!(stats.reset().await.is_err());
    }
}
