use std::str::FromStr;
use std::sync::Arc;

use storage::repository::Storage;

use crate::error::{AppServicesError, SessionError};
use crate::questions::{
    HttpMoviesLoader, MoviesFeedConfig, QuestionSource, RemoteQuestionSource,
    StaticQuestionSource,
};
use crate::quiz::QuizSession;
use crate::statistics::StatisticsStore;
use crate::Clock;

/// Where questions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Static,
    Remote,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown question source: {other}")),
        }
    }
}

/// Assembles the statistics store and question source for the app.
#[derive(Clone)]
pub struct AppServices {
    statistics: Arc<StatisticsStore>,
    source: Arc<dyn QuestionSource>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// remote source is requested without a feed configuration.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        kind: SourceKind,
        feed: Option<MoviesFeedConfig>,
    ) -> Result<Self, AppServicesError> {
        let source = build_source(kind, feed)?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock, source))
    }

    /// Build services over an existing storage, e.g. `Storage::in_memory()`.
    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock, source: Arc<dyn QuestionSource>) -> Self {
        let statistics = Arc::new(StatisticsStore::new(clock, Arc::clone(&storage.values)));
        Self { statistics, source }
    }

    #[must_use]
    pub fn statistics(&self) -> Arc<StatisticsStore> {
        Arc::clone(&self.statistics)
    }

    #[must_use]
    pub fn source(&self) -> Arc<dyn QuestionSource> {
        Arc::clone(&self.source)
    }

    /// Start a new quiz session over the configured source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the source offers no questions.
    pub fn new_session(&self) -> Result<QuizSession, SessionError> {
        QuizSession::new(self.source(), self.statistics())
    }
}

fn build_source(
    kind: SourceKind,
    feed: Option<MoviesFeedConfig>,
) -> Result<Arc<dyn QuestionSource>, AppServicesError> {
    match kind {
        SourceKind::Static => Ok(Arc::new(StaticQuestionSource::builtin())),
        SourceKind::Remote => {
            let config = feed.ok_or(AppServicesError::FeedNotConfigured)?;
            let loader = Arc::new(HttpMoviesLoader::new(config));
            Ok(Arc::new(RemoteQuestionSource::new(loader)))
        }
    }
}
