use std::env;

use async_trait::async_trait;
use quiz_core::model::{Movie, MovieId};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::QuestionSourceError;

const DEFAULT_FEED_URL: &str = "https://tv-api.com/en/API/Top250Movies";

#[derive(Clone, Debug)]
pub struct MoviesFeedConfig {
    pub base_url: String,
    pub api_key: String,
}

impl MoviesFeedConfig {
    /// Reads `QUIZ_API_KEY` and `QUIZ_FEED_URL`. `None` without an API key.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("QUIZ_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.into());
        Some(Self {
            base_url,
            api_key: api_key.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn catalog_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.api_key)
    }
}

/// Transport for the movie catalog and poster images.
#[async_trait]
pub trait MoviesLoader: Send + Sync {
    /// Fetch the movie catalog.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the request fails or the payload is
    /// not a usable catalog.
    async fn load_movies(&self) -> Result<Vec<Movie>, QuestionSourceError>;

    /// Fetch poster bytes.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` if the image cannot be downloaded.
    async fn load_poster(&self, url: &Url) -> Result<Vec<u8>, QuestionSourceError>;
}

#[derive(Clone)]
pub struct HttpMoviesLoader {
    client: Client,
    config: MoviesFeedConfig,
}

impl HttpMoviesLoader {
    #[must_use]
    pub fn new(config: MoviesFeedConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl MoviesLoader for HttpMoviesLoader {
    async fn load_movies(&self) -> Result<Vec<Movie>, QuestionSourceError> {
        let response = self.client.get(self.config.catalog_url()).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }
        let body = response.bytes().await?;
        parse_catalog(&body)
    }

    async fn load_poster(&self, url: &Url) -> Result<Vec<u8>, QuestionSourceError> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Decode a catalog payload.
///
/// Entries whose image URL does not parse are skipped.
///
/// # Errors
///
/// Returns `QuestionSourceError::Decode` for malformed JSON,
/// `QuestionSourceError::Api` if the feed reports an error message and
/// `QuestionSourceError::EmptyCatalog` if no usable movie remains.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<Movie>, QuestionSourceError> {
    let payload: MostPopularMovies = serde_json::from_slice(body)?;

    if let Some(message) = payload.error_message.filter(|m| !m.trim().is_empty()) {
        return Err(QuestionSourceError::Api(message));
    }

    let movies: Vec<Movie> = payload
        .items
        .into_iter()
        .filter_map(|item| match Url::parse(&item.image) {
            Ok(image_url) => Some(Movie::new(
                MovieId::new(item.id),
                item.title,
                item.rating,
                image_url,
            )),
            Err(err) => {
                debug!(id = %item.id, %err, "skipping movie without a valid poster url");
                None
            }
        })
        .collect();

    if movies.is_empty() {
        return Err(QuestionSourceError::EmptyCatalog);
    }
    Ok(movies)
}

#[derive(Debug, Deserialize)]
struct MostPopularMovies {
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
    #[serde(default)]
    items: Vec<MostPopularMovie>,
}

#[derive(Debug, Deserialize)]
struct MostPopularMovie {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "imDbRating", default)]
    rating: String,
    image: String,
}
