//! Terminal presentation of a quiz round.

use std::io::Write;
use std::time::Duration;

use quiz_core::model::{AggregateStats, Poster};
use services::{
    AdvanceOutcome, AlertModel, AppServices, QuestionView, QuizSession, RoundReport,
    SessionUpdate,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

const BEST_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Line-based yes/no input from stdin.
struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next yes/no answer; `None` once stdin is closed.
    async fn yes_no(&mut self, prompt: &str) -> std::io::Result<Option<bool>> {
        loop {
            print!("{prompt} [д/н]: ");
            std::io::stdout().flush()?;
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            match parse_answer(&line) {
                Some(answer) => return Ok(Some(answer)),
                None => println!("Ответьте «да» или «нет»."),
            }
        }
    }
}

fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "д" | "да" | "y" | "yes" | "1" => Some(true),
        "н" | "нет" | "n" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn describe_poster(poster: &Poster) -> String {
    match poster {
        Poster::Asset(name) => format!("[постер: {name}]"),
        Poster::Data(bytes) if bytes.is_empty() => "[постер недоступен]".to_owned(),
        Poster::Data(bytes) => format!("[постер: {} байт]", bytes.len()),
    }
}

fn show_question(view: &QuestionView) {
    println!();
    println!("{} {}", view.title(), view.position_label());
    println!("{}", describe_poster(view.question.poster()));
    println!("{}", view.question.text());
}

fn show_alert(alert: &AlertModel) {
    println!();
    println!("== {} ==", alert.title);
    println!("{}", alert.message);
}

/// Aggregate statistics as printed by the `stats` command.
pub fn format_stats(stats: &AggregateStats) -> String {
    let best = stats.best_game;
    let best_date = best
        .date()
        .with_timezone(&chrono::Local)
        .format(BEST_DATE_FORMAT);
    format!(
        "Количество сыгранных квизов: {}\n\
         Рекорд: {}/{} ({})\n\
         Средняя точность: {:.2}%",
        stats.games_count,
        best.correct(),
        best.total(),
        best_date,
        stats.accuracy(),
    )
}

/// What the loop does after a round ends.
enum NextRound {
    Play,
    Quit,
}

async fn finish_round(report: &RoundReport, input: &mut Input) -> std::io::Result<NextRound> {
    let alert = report.alert();
    show_alert(&alert);
    match input.yes_no(&alert.button_text).await? {
        Some(true) => Ok(NextRound::Play),
        _ => Ok(NextRound::Quit),
    }
}

/// Handle the result of `advance`. Returns `false` when the player quits.
async fn after_advance(
    session: &mut QuizSession,
    outcome: AdvanceOutcome,
    input: &mut Input,
) -> std::io::Result<bool> {
    match outcome {
        AdvanceOutcome::RoundComplete(report) => match finish_round(&report, input).await? {
            NextRound::Play => {
                session.restart();
                let next = session.advance().await;
                debug!(?next, "new round");
                Ok(true)
            }
            NextRound::Quit => Ok(false),
        },
        other => {
            debug!(?other, "advanced");
            Ok(true)
        }
    }
}

/// Play rounds until the player quits or stdin closes.
///
/// # Errors
///
/// Returns an error if the session cannot be created or the terminal fails.
pub async fn run(
    services: &AppServices,
    answer_delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = services.new_session()?;
    let mut input = Input::stdin();

    session.load_data();
    while let Some(update) = session.next_update().await {
        match update {
            SessionUpdate::DataReady { count } => {
                debug!(count, "questions ready");
                let outcome = session.advance().await;
                if !after_advance(&mut session, outcome, &mut input).await? {
                    break;
                }
            }
            SessionUpdate::DataFailed(err) => {
                let alert = AlertModel::network_error(&err);
                show_alert(&alert);
                match input.yes_no(&alert.button_text).await? {
                    Some(true) => {
                        session.load_data();
                    }
                    _ => break,
                }
            }
            SessionUpdate::QuestionShown(view) => {
                show_question(&view);
                let Some(answer) = input.yes_no("Ваш ответ").await? else {
                    break;
                };
                if let Some(outcome) = session.answer(answer) {
                    if outcome.is_correct {
                        println!("Верно!");
                    } else {
                        println!("Неверно.");
                    }
                }
                tokio::time::sleep(answer_delay).await;
                let outcome = session.advance().await;
                if !after_advance(&mut session, outcome, &mut input).await? {
                    break;
                }
            }
            SessionUpdate::RoundComplete(report) => {
                if let NextRound::Quit = finish_round(&report, &mut input).await? {
                    break;
                }
                session.restart();
                let next = session.advance().await;
                debug!(?next, "new round");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::GameRecord;
    use quiz_core::time::fixed_now;

    #[test]
    fn parses_russian_and_english_answers() {
        assert_eq!(parse_answer(" Да "), Some(true));
        assert_eq!(parse_answer("y"), Some(true));
        assert_eq!(parse_answer("нет"), Some(false));
        assert_eq!(parse_answer("N"), Some(false));
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn describes_posters() {
        assert_eq!(
            describe_poster(&Poster::Asset("Deadpool".into())),
            "[постер: Deadpool]"
        );
        assert_eq!(describe_poster(&Poster::empty()), "[постер недоступен]");
        assert_eq!(describe_poster(&Poster::Data(vec![0; 4])), "[постер: 4 байт]");
    }

    #[test]
    fn stats_summary_shows_accuracy() {
        let stats = AggregateStats {
            games_count: 2,
            best_game: GameRecord::new(7, 10, fixed_now()).unwrap(),
            total_correct: 12,
            total_questions: 20,
        };
        let text = format_stats(&stats);
        assert!(text.starts_with("Количество сыгранных квизов: 2\nРекорд: 7/10 ("));
        assert!(text.ends_with("Средняя точность: 60.00%"));
    }
}
