use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use quiz_core::model::{Comparison, Movie, Poster, RatingRule};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use super::loader::MoviesLoader;
use super::{LoadOutcome, QuestionOutcome, QuestionSource};
use crate::error::QuestionSourceError;

/// Questions per round for feed-backed quizzes.
pub const REMOTE_ROUND_SIZE: usize = 10;

const MIN_THRESHOLD: u8 = 6;
const MAX_THRESHOLD: u8 = 8;

/// Draw an independent uniform threshold in `[6, 8]` and comparison direction.
pub fn draw_rule<R: Rng + ?Sized>(rng: &mut R) -> RatingRule {
    let threshold = rng.random_range(MIN_THRESHOLD..=MAX_THRESHOLD);
    let comparison = if rng.random_bool(0.5) {
        Comparison::Greater
    } else {
        Comparison::Less
    };
    RatingRule::new(threshold, comparison)
}

/// Random rating questions about movies from a remote catalog.
pub struct RemoteQuestionSource {
    loader: Arc<dyn MoviesLoader>,
    movies: RwLock<Vec<Movie>>,
    rng: Mutex<StdRng>,
}

impl RemoteQuestionSource {
    #[must_use]
    pub fn new(loader: Arc<dyn MoviesLoader>) -> Self {
        Self {
            loader,
            movies: RwLock::new(Vec::new()),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Replace the random generator, e.g. with a seeded one in tests.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Number of movies currently loaded.
    #[must_use]
    pub fn catalog_len(&self) -> usize {
        self.movies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn pick(&self) -> Option<(Movie, RatingRule)> {
        let movies = self.movies.read().unwrap_or_else(PoisonError::into_inner);
        if movies.is_empty() {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let movie = movies[rng.random_range(0..movies.len())].clone();
        Some((movie, draw_rule(&mut *rng)))
    }
}

#[async_trait]
impl QuestionSource for RemoteQuestionSource {
    fn total(&self) -> usize {
        REMOTE_ROUND_SIZE
    }

    async fn load_data(&self) -> LoadOutcome {
        match self.loader.load_movies().await {
            Ok(movies) if movies.is_empty() => {
                LoadOutcome::Failed(QuestionSourceError::EmptyCatalog)
            }
            Ok(movies) => {
                let count = movies.len();
                *self.movies.write().unwrap_or_else(PoisonError::into_inner) = movies;
                LoadOutcome::Loaded { count }
            }
            Err(err) => LoadOutcome::Failed(err),
        }
    }

    /// The index is ignored: every call draws a fresh random movie and rule.
    async fn question(&self, _index: usize) -> QuestionOutcome {
        let Some((movie, rule)) = self.pick() else {
            return QuestionOutcome::Exhausted;
        };

        let poster = match self.loader.load_poster(&movie.image_url).await {
            Ok(bytes) => Poster::Data(bytes),
            Err(err) => {
                warn!(movie = %movie.id, %err, "failed to load poster, showing none");
                Poster::empty()
            }
        };

        QuestionOutcome::Question(rule.question(poster, movie.rating_value()))
    }
}
