use thiserror::Error;

use crate::model::GameRecordError;
use crate::quiz::QuizError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    GameRecord(#[from] GameRecordError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}
