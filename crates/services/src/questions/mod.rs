//! Question supply: a bundled list or a remote movie feed.

mod loader;
mod remote;
mod static_list;

use async_trait::async_trait;
use quiz_core::model::Question;

use crate::error::QuestionSourceError;

pub use loader::{HttpMoviesLoader, MoviesFeedConfig, MoviesLoader, parse_catalog};
pub use remote::{REMOTE_ROUND_SIZE, RemoteQuestionSource, draw_rule};
pub use static_list::StaticQuestionSource;

/// Outcome of preparing a source for a round.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed(QuestionSourceError),
}

/// Outcome of asking a source for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    Question(Question),
    Exhausted,
}

/// Supplies the questions of a round.
///
/// Implementations are shared with background tasks, so all methods take
/// `&self`.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Number of questions in one round.
    fn total(&self) -> usize;

    /// Prepare the source. Sources without remote data report `Loaded` at once.
    async fn load_data(&self) -> LoadOutcome;

    /// Question for the zero-based `index` of the round.
    async fn question(&self, index: usize) -> QuestionOutcome;
}
