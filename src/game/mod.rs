// Authoritative game state shared by the REST and socket surfaces

pub mod questions;
pub mod scoreboard;

pub use questions::QuestionDesk;
pub use scoreboard::ScoreboardModel;
