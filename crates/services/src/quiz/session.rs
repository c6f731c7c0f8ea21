//! Drives one quiz round against a question source.
//!
//! Source calls run on spawned tasks and report back through a channel owned
//! by the session; only [`QuizSession::next_update`] applies them, so every
//! state change happens on the task that owns the session. A source task that
//! panics still reports: a failed load, or an exhausted source for a question.

use std::sync::Arc;

use quiz_core::quiz::{Advance, AnswerOutcome, Delivery, QuizState, RequestTicket, RoundResult};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use super::report::{QuestionView, RoundReport};
use crate::error::{QuestionSourceError, SessionError};
use crate::questions::{LoadOutcome, QuestionOutcome, QuestionSource};
use crate::statistics::StatisticsStore;

enum SourceEvent {
    Loaded(LoadOutcome),
    Question {
        ticket: RequestTicket,
        outcome: QuestionOutcome,
    },
}

/// Something the presentation layer has to react to.
#[derive(Debug)]
pub enum SessionUpdate {
    DataReady { count: usize },
    /// Loading failed; the round was reset and `load_data` may be retried.
    DataFailed(QuestionSourceError),
    QuestionShown(QuestionView),
    RoundComplete(RoundReport),
}

/// Result of [`QuizSession::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Data has not been loaded yet.
    NotReady,
    /// A question was requested; it arrives through `next_update`.
    QuestionRequested,
    AlreadyWaiting,
    RoundComplete(RoundReport),
    /// Nothing to do in the current phase.
    Ignored,
}

pub struct QuizSession {
    state: QuizState,
    source: Arc<dyn QuestionSource>,
    statistics: Arc<StatisticsStore>,
    data_ready: bool,
    loading: bool,
    in_flight: usize,
    events_tx: mpsc::UnboundedSender<SourceEvent>,
    events_rx: mpsc::UnboundedReceiver<SourceEvent>,
}

impl QuizSession {
    /// Create a session sized to the source's round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Quiz` if the source offers no questions.
    pub fn new(
        source: Arc<dyn QuestionSource>,
        statistics: Arc<StatisticsStore>,
    ) -> Result<Self, SessionError> {
        let state = QuizState::new(source.total())?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            state,
            source,
            statistics,
            data_ready: false,
            loading: false,
            in_flight: 0,
            events_tx,
            events_rx,
        })
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn is_data_ready(&self) -> bool {
        self.data_ready
    }

    #[must_use]
    pub fn statistics(&self) -> &Arc<StatisticsStore> {
        &self.statistics
    }

    /// Start loading source data in the background.
    ///
    /// Returns `false` if a load is already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn load_data(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;

        let source = Arc::clone(&self.source);
        self.spawn_watched(
            async move { SourceEvent::Loaded(source.load_data().await) },
            |err| {
                warn!(%err, "question source load task failed");
                SourceEvent::Loaded(LoadOutcome::Failed(QuestionSourceError::TaskFailed(
                    err.to_string(),
                )))
            },
        );
        true
    }

    /// Move the round forward: request the next question or finish the round.
    ///
    /// Finishing records the round in the statistics store exactly once.
    pub async fn advance(&mut self) -> AdvanceOutcome {
        if !self.data_ready {
            return AdvanceOutcome::NotReady;
        }
        match self.state.advance() {
            Advance::Request(ticket) => {
                self.request_question(ticket);
                AdvanceOutcome::QuestionRequested
            }
            Advance::Pending(_) => AdvanceOutcome::AlreadyWaiting,
            Advance::Complete(result) => AdvanceOutcome::RoundComplete(self.finish(result).await),
            Advance::Ignored => AdvanceOutcome::Ignored,
        }
    }

    /// Score an answer for the shown question; `None` if no question is shown.
    pub fn answer(&mut self, answer: bool) -> Option<AnswerOutcome> {
        self.state.answer(answer)
    }

    /// Start the round over. Questions still in flight will be discarded.
    pub fn restart(&mut self) {
        self.state.restart();
    }

    /// Wait for the next background result and apply it.
    ///
    /// Stale question deliveries are dropped silently. Returns `None` when no
    /// background work is outstanding.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        while self.in_flight > 0 {
            let event = self.events_rx.recv().await?;
            self.in_flight -= 1;
            if let Some(update) = self.apply(event).await {
                return Some(update);
            }
        }
        None
    }

    fn request_question(&mut self, ticket: RequestTicket) {
        let source = Arc::clone(&self.source);
        self.spawn_watched(
            async move {
                let outcome = source.question(ticket.index()).await;
                SourceEvent::Question { ticket, outcome }
            },
            move |err| {
                warn!(%err, index = ticket.index(), "question task failed, ending round");
                SourceEvent::Question {
                    ticket,
                    outcome: QuestionOutcome::Exhausted,
                }
            },
        );
    }

    /// Run `work` on its own task and forward its event, or `recover`'s event
    /// if the task panicked or was cancelled. Each call counts once in
    /// `in_flight` and sends exactly one event.
    fn spawn_watched<W, R>(&mut self, work: W, recover: R)
    where
        W: Future<Output = SourceEvent> + Send + 'static,
        R: FnOnce(JoinError) -> SourceEvent + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.events_tx.clone();
        let handle = tokio::spawn(work);
        tokio::spawn(async move {
            let event = match handle.await {
                Ok(event) => event,
                Err(err) => recover(err),
            };
            // the session may be gone by now
            let _ = tx.send(event);
        });
    }

    async fn apply(&mut self, event: SourceEvent) -> Option<SessionUpdate> {
        match event {
            SourceEvent::Loaded(LoadOutcome::Loaded { count }) => {
                self.loading = false;
                self.data_ready = true;
                Some(SessionUpdate::DataReady { count })
            }
            SourceEvent::Loaded(LoadOutcome::Failed(err)) => {
                self.loading = false;
                self.data_ready = false;
                self.state.restart();
                Some(SessionUpdate::DataFailed(err))
            }
            SourceEvent::Question { ticket, outcome } => {
                let question = match outcome {
                    QuestionOutcome::Question(question) => Some(question),
                    QuestionOutcome::Exhausted => None,
                };
                match self.state.deliver(ticket, question) {
                    Delivery::Shown => self.question_view().map(SessionUpdate::QuestionShown),
                    Delivery::Completed(result) => {
                        Some(SessionUpdate::RoundComplete(self.finish(result).await))
                    }
                    Delivery::Stale => {
                        debug!(
                            generation = ticket.generation(),
                            index = ticket.index(),
                            "dropping stale question"
                        );
                        None
                    }
                }
            }
        }
    }

    fn question_view(&self) -> Option<QuestionView> {
        let question = self.state.current_question()?.clone();
        Some(QuestionView {
            question,
            index: self.state.current_index(),
            total: self.state.total(),
        })
    }

    async fn finish(&self, result: RoundResult) -> RoundReport {
        // a round that ended before any answer is not a game
        if result.total > 0 {
            self.statistics.store(result.correct, result.total).await;
        }
        let stats = self.statistics.snapshot().await;
        info!(
            correct = result.correct,
            total = result.total,
            games = stats.games_count,
            "round complete"
        );
        RoundReport { result, stats }
    }
}
