use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Catalog identifier, e.g. `tt0111161`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovieId(String);

impl MovieId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MovieId({})", self.0)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry a question can be derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Rating as published by the feed, e.g. `"9.2"`.
    pub rating: String,
    pub image_url: Url,
}

impl Movie {
    #[must_use]
    pub fn new(id: MovieId, title: impl Into<String>, rating: impl Into<String>, image_url: Url) -> Self {
        Self {
            id,
            title: title.into(),
            rating: rating.into(),
            image_url,
        }
    }

    /// Numeric rating; an unparsable or blank rating counts as `0.0`.
    #[must_use]
    pub fn rating_value(&self) -> f32 {
        self.rating.trim().parse().unwrap_or(0.0)
    }
}
