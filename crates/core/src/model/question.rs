use std::fmt;

use serde::{Deserialize, Serialize};

//
// ─── POSTER ────────────────────────────────────────────────────────────────────
//

/// Image shown next to a question.
///
/// Bundled questions point at a named asset; feed-backed questions carry the
/// downloaded bytes, which may be empty when the download failed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Poster {
    Asset(String),
    Data(Vec<u8>),
}

impl Poster {
    #[must_use]
    pub fn empty() -> Self {
        Self::Data(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Poster::Asset(name) => name.is_empty(),
            Poster::Data(bytes) => bytes.is_empty(),
        }
    }

    #[must_use]
    pub fn asset_name(&self) -> Option<&str> {
        match self {
            Poster::Asset(name) => Some(name.as_str()),
            Poster::Data(_) => None,
        }
    }

    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Poster::Asset(_) => None,
            Poster::Data(bytes) => Some(bytes.as_slice()),
        }
    }
}

impl fmt::Debug for Poster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Poster::Asset(name) => write!(f, "Poster::Asset({name})"),
            Poster::Data(bytes) => write!(f, "Poster::Data({} bytes)", bytes.len()),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One yes/no quiz question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    poster: Poster,
    text: String,
    correct_answer: bool,
}

impl Question {
    #[must_use]
    pub fn new(poster: Poster, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            poster,
            text: text.into(),
            correct_answer,
        }
    }

    #[must_use]
    pub fn poster(&self) -> &Poster {
        &self.poster
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    /// Returns true if `answer` matches the expected answer.
    #[must_use]
    pub fn is_correct(&self, answer: bool) -> bool {
        answer == self.correct_answer
    }
}

//
// ─── RATING RULE ───────────────────────────────────────────────────────────────
//

/// Direction of a rating comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Greater,
    Less,
}

impl Comparison {
    #[must_use]
    pub fn word(self) -> &'static str {
        match self {
            Comparison::Greater => "больше",
            Comparison::Less => "меньше",
        }
    }

    #[must_use]
    pub fn holds(self, rating: f32, threshold: f32) -> bool {
        match self {
            Comparison::Greater => rating > threshold,
            Comparison::Less => rating < threshold,
        }
    }
}

/// "Is the rating of this movie greater/less than N?"
///
/// The text and the expected answer are both derived from the same
/// `comparison`, so they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingRule {
    pub threshold: u8,
    pub comparison: Comparison,
}

impl RatingRule {
    #[must_use]
    pub fn new(threshold: u8, comparison: Comparison) -> Self {
        Self {
            threshold,
            comparison,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "Рейтинг этого фильма {} чем {}?",
            self.comparison.word(),
            self.threshold
        )
    }

    #[must_use]
    pub fn expected(&self, rating: f32) -> bool {
        self.comparison.holds(rating, f32::from(self.threshold))
    }

    #[must_use]
    pub fn question(&self, poster: Poster, rating: f32) -> Question {
        Question::new(poster, self.text(), self.expected(rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greater_rule_text_and_answer_agree() {
        let rule = RatingRule::new(7, Comparison::Greater);
        let q = rule.question(Poster::empty(), 8.1);
        assert_eq!(q.text(), "Рейтинг этого фильма больше чем 7?");
        assert!(q.correct_answer());
        assert!(!rule.expected(7.0));
    }

    #[test]
    fn less_rule_text_and_answer_agree() {
        let rule = RatingRule::new(6, Comparison::Less);
        let q = rule.question(Poster::empty(), 5.8);
        assert_eq!(q.text(), "Рейтинг этого фильма меньше чем 6?");
        assert!(q.correct_answer());
        assert!(!rule.expected(6.0));
    }

    #[test]
    fn poster_reports_emptiness() {
        assert!(Poster::empty().is_empty());
        assert!(!Poster::Asset("Deadpool".into()).is_empty());
        assert_eq!(Poster::Data(vec![1, 2]).bytes(), Some(&[1_u8, 2][..]));
        assert_eq!(format!("{:?}", Poster::Data(vec![0; 3])), "Poster::Data(3 bytes)");
    }

    #[test]
    fn is_correct_compares_with_expected_answer() {
        let q = Question::new(Poster::Asset("Old".into()), "?", false);
        assert!(q.is_correct(false));
        assert!(!q.is_correct(true));
    }
}
