mod report;
mod session;

pub use report::{AlertModel, QuestionView, RoundReport};
pub use session::{AdvanceOutcome, QuizSession, SessionUpdate};
