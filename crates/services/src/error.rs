//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::quiz::QuizError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors reported by question sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("movie feed request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("movie feed response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("movie feed reported an error: {0}")]
    Api(String),
    #[error("movie feed returned no movies")]
    EmptyCatalog,
    #[error("question source task failed: {0}")]
    TaskFailed(String),
}

/// Errors emitted by `QuizSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors emitted by `StatisticsStore` operations that are not best-effort.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("remote questions need QUIZ_API_KEY to be set")]
    FeedNotConfigured,
}
