//! Linear quiz round state machine.
//!
//! `AwaitingQuestion → QuestionShown → AnswerRecorded → (QuestionShown | RoundComplete)`
//!
//! The machine is pure: it never fetches questions itself. `advance` hands out a
//! [`RequestTicket`] and the caller later returns the fetched question through
//! [`QuizState::deliver`] together with that ticket. Deliveries whose ticket no
//! longer matches (late results after a restart, duplicates) are rejected.

use thiserror::Error;

use crate::model::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a round needs at least one question")]
    EmptyRound,

    #[error("round of {0} questions is too large")]
    TooManyQuestions(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    AwaitingQuestion,
    QuestionShown,
    AnswerRecorded,
    RoundComplete,
}

/// Identifies one outstanding question request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    generation: u64,
    index: usize,
}

impl RequestTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Feedback for a scored answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    pub is_correct: bool,
    pub correct_count: u32,
}

/// Final score of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub correct: u32,
    pub total: u32,
}

/// What the caller has to do after [`QuizState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Fetch the question at `ticket.index()` and deliver it.
    Request(RequestTicket),
    /// A request is already outstanding.
    Pending(RequestTicket),
    /// The last answer has been recorded; the round is over.
    Complete(RoundResult),
    /// Nothing to do in the current phase.
    Ignored,
}

/// Result of handing a fetched question back to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Shown,
    /// The source ran out of questions before the round's last index.
    Completed(RoundResult),
    Stale,
}

#[derive(Debug, Clone)]
pub struct QuizState {
    total: u32,
    current_index: usize,
    correct: u32,
    phase: QuizPhase,
    generation: u64,
    pending: Option<RequestTicket>,
    current: Option<Question>,
}

impl QuizState {
    /// Create a fresh round of `total` questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyRound` for `total == 0` and
    /// `QuizError::TooManyQuestions` if `total` does not fit the counters.
    pub fn new(total: usize) -> Result<Self, QuizError> {
        if total == 0 {
            return Err(QuizError::EmptyRound);
        }
        let total = u32::try_from(total).map_err(|_| QuizError::TooManyQuestions(total))?;
        Ok(Self {
            total,
            current_index: 0,
            correct: 0,
            phase: QuizPhase::AwaitingQuestion,
            generation: 0,
            pending: None,
            current: None,
        })
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    fn is_last(&self) -> bool {
        self.current_index + 1 >= self.total as usize
    }

    fn ticket(&self) -> RequestTicket {
        RequestTicket {
            generation: self.generation,
            index: self.current_index,
        }
    }

    fn request(&mut self) -> Advance {
        let ticket = self.ticket();
        self.pending = Some(ticket);
        Advance::Request(ticket)
    }

    fn complete(&mut self, total: u32) -> RoundResult {
        self.phase = QuizPhase::RoundComplete;
        self.pending = None;
        self.current = None;
        RoundResult {
            correct: self.correct,
            total,
        }
    }

    /// Move the round forward.
    ///
    /// Completion is reported once; later calls in `RoundComplete` are ignored
    /// until [`QuizState::restart`].
    pub fn advance(&mut self) -> Advance {
        match self.phase {
            QuizPhase::AwaitingQuestion => match self.pending {
                Some(ticket) => Advance::Pending(ticket),
                None => self.request(),
            },
            QuizPhase::AnswerRecorded if self.is_last() => {
                Advance::Complete(self.complete(self.total))
            }
            QuizPhase::AnswerRecorded => {
                self.current_index += 1;
                self.current = None;
                self.phase = QuizPhase::AwaitingQuestion;
                self.request()
            }
            QuizPhase::QuestionShown | QuizPhase::RoundComplete => Advance::Ignored,
        }
    }

    /// Hand back the result of a request made through [`QuizState::advance`].
    ///
    /// `None` means the source had no question for the ticket's index; the
    /// round then ends with the questions answered so far.
    pub fn deliver(&mut self, ticket: RequestTicket, question: Option<Question>) -> Delivery {
        if self.phase != QuizPhase::AwaitingQuestion || self.pending != Some(ticket) {
            return Delivery::Stale;
        }
        self.pending = None;
        match question {
            Some(question) => {
                self.current = Some(question);
                self.phase = QuizPhase::QuestionShown;
                Delivery::Shown
            }
            None => {
                // index is the number of questions already answered
                let answered = u32::try_from(self.current_index).unwrap_or(self.total);
                Delivery::Completed(self.complete(answered))
            }
        }
    }

    /// Score an answer for the shown question.
    ///
    /// Returns `None` outside `QuestionShown`, so a second tap before the next
    /// question is not counted.
    pub fn answer(&mut self, answer: bool) -> Option<AnswerOutcome> {
        if self.phase != QuizPhase::QuestionShown {
            return None;
        }
        let is_correct = self.current.as_ref()?.is_correct(answer);
        if is_correct {
            self.correct = self.correct.saturating_add(1);
        }
        self.phase = QuizPhase::AnswerRecorded;
        Some(AnswerOutcome {
            index: self.current_index,
            is_correct,
            correct_count: self.correct,
        })
    }

    /// Zero the counters and start over. Outstanding tickets become stale.
    pub fn restart(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.current_index = 0;
        self.correct = 0;
        self.phase = QuizPhase::AwaitingQuestion;
        self.pending = None;
        self.current = None;
    }
}
