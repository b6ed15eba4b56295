pub mod contestant;
pub mod cue;
pub mod question;

pub use contestant::{
    Contestant, ContestantInput, GameMode, GameSettings, GameSettingsRecord, ScoreboardData,
    ScoreboardUpdate,
};
pub use cue::{AnswerCue, AnswerRef, ChoicesCue, FactCue, Highlight, QuestionCue};
pub use question::{
    AnswerKey, Answers, Question, QueuedQuestion, QueuedQuestionRecord, QuestionRecord,
};
