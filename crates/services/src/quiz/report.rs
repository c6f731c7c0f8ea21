use std::fmt::Display;

use chrono::{Local, TimeZone};
use quiz_core::model::{AggregateStats, Question};
use quiz_core::quiz::RoundResult;

use crate::error::QuestionSourceError;

const QUESTION_TITLE: &str = "Вопрос:";
const RESULTS_TITLE: &str = "Этот раунд окончен!";
const RESULTS_BUTTON: &str = "Сыграть ещё раз";
const ERROR_TITLE: &str = "Ошибка";
const ERROR_BUTTON: &str = "Попробовать ещё раз";
const BEST_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// A question ready to be shown, with its position in the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub question: Question,
    pub index: usize,
    pub total: u32,
}

impl QuestionView {
    #[must_use]
    pub fn title(&self) -> &'static str {
        QUESTION_TITLE
    }

    /// 1-based position, e.g. `"3/10"`.
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.index + 1, self.total)
    }
}

/// Title, message and single action of a modal alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertModel {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl AlertModel {
    /// Retryable network error.
    #[must_use]
    pub fn network_error(error: &QuestionSourceError) -> Self {
        Self {
            title: ERROR_TITLE.to_owned(),
            message: error.to_string(),
            button_text: ERROR_BUTTON.to_owned(),
        }
    }
}

/// Score of the finished round plus the updated aggregate statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub result: RoundResult,
    pub stats: AggregateStats,
}

impl RoundReport {
    /// Results message with the best-game date in local time.
    #[must_use]
    pub fn message(&self) -> String {
        self.message_in(&Local)
    }

    #[must_use]
    pub fn message_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let best = self.stats.best_game;
        let best_date = best.date().with_timezone(tz).format(BEST_DATE_FORMAT);
        format!(
            "Ваш результат: {}/{}\n\
             Количество сыгранных квизов: {}\n\
             Рекорд: {}/{} ({})\n\
             Средняя точность: {:.2}%",
            self.result.correct,
            self.result.total,
            self.stats.games_count,
            best.correct(),
            best.total(),
            best_date,
            self.stats.accuracy(),
        )
    }

    #[must_use]
    pub fn alert(&self) -> AlertModel {
        AlertModel {
            title: RESULTS_TITLE.to_owned(),
            message: self.message(),
            button_text: RESULTS_BUTTON.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quiz_core::model::{GameRecord, Poster};
    use quiz_core::time::fixed_now;

    #[test]
    fn results_message_lists_round_and_totals() {
        let report = RoundReport {
            result: RoundResult { correct: 5, total: 10 },
            stats: AggregateStats {
                games_count: 3,
                best_game: GameRecord::new(8, 10, fixed_now()).unwrap(),
                total_correct: 20,
                total_questions: 30,
            },
        };
        assert_eq!(
            report.message_in(&Utc),
            "Ваш результат: 5/10\n\
             Количество сыгранных квизов: 3\n\
             Рекорд: 8/10 (14.11.2023 22:13)\n\
             Средняя точность: 66.67%"
        );
        let alert = report.alert();
        assert_eq!(alert.title, "Этот раунд окончен!");
        assert_eq!(alert.button_text, "Сыграть ещё раз");
    }

    #[test]
    fn network_error_alert_offers_retry() {
        let alert = AlertModel::network_error(&QuestionSourceError::EmptyCatalog);
        assert_eq!(alert.title, "Ошибка");
        assert_eq!(alert.message, "movie feed returned no movies");
        assert_eq!(alert.button_text, "Попробовать ещё раз");
    }

    #[test]
    fn question_view_position_is_one_based() {
        let view = QuestionView {
            question: Question::new(Poster::empty(), "?", true),
            index: 2,
            total: 10,
        };
        assert_eq!(view.position_label(), "3/10");
        assert_eq!(view.title(), "Вопрос:");
    }
}
