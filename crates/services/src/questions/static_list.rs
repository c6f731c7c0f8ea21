use async_trait::async_trait;
use quiz_core::model::{Poster, Question};

use super::{LoadOutcome, QuestionOutcome, QuestionSource};

const DEFAULT_TEXT: &str = "Рейтинг этого фильма больше чем 6?";

/// Bundled movies: poster asset name and whether the rating is above 6.
const BUILTIN: [(&str, bool); 10] = [
    ("The Godfather", true),
    ("The Dark Knight", true),
    ("Kill Bill", true),
    ("The Avengers", true),
    ("Deadpool", true),
    ("The Green Knight", true),
    ("Old", false),
    ("The Ice Age Adventures of Buck Wild", false),
    ("Tesla", false),
    ("Vivarium", false),
];

/// Fixed, ordered list of questions.
#[derive(Debug, Clone)]
pub struct StaticQuestionSource {
    questions: Vec<Question>,
}

impl StaticQuestionSource {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The ten bundled movie questions.
    #[must_use]
    pub fn builtin() -> Self {
        let questions = BUILTIN
            .iter()
            .map(|(asset, answer)| {
                Question::new(Poster::Asset((*asset).to_owned()), DEFAULT_TEXT, *answer)
            })
            .collect();
        Self::new(questions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`, or `None` past the end of the list.
    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

impl Default for StaticQuestionSource {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    fn total(&self) -> usize {
        self.len()
    }

    async fn load_data(&self) -> LoadOutcome {
        LoadOutcome::Loaded { count: self.len() }
    }

    async fn question(&self, index: usize) -> QuestionOutcome {
        self.question_at(index)
            .cloned()
            .map_or(QuestionOutcome::Exhausted, QuestionOutcome::Question)
    }
}
