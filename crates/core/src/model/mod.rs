mod game_record;
mod movie;
mod question;
mod stats;

pub use game_record::{GameRecord, GameRecordError};
pub use movie::{Movie, MovieId};
pub use question::{Comparison, Poster, Question, RatingRule};
pub use stats::AggregateStats;
