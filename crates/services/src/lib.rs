#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod questions;
pub mod quiz;
pub mod statistics;

pub use quiz_core::Clock;

pub use app_services::{AppServices, SourceKind};
pub use error::{AppServicesError, QuestionSourceError, SessionError, StatisticsError};
pub use questions::{
    HttpMoviesLoader, LoadOutcome, MoviesFeedConfig, MoviesLoader, QuestionOutcome,
    QuestionSource, RemoteQuestionSource, StaticQuestionSource,
};
pub use quiz::{AdvanceOutcome, AlertModel, QuestionView, QuizSession, RoundReport, SessionUpdate};
pub use statistics::StatisticsStore;
