use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "a",
            AnswerKey::B => "b",
            AnswerKey::C => "c",
            AnswerKey::D => "d",
        }
    }

    /// Map a 1-based answer position onto a key, wrapping every four answers
    pub fn from_position(position: u32) -> Option<Self> {
        if position == 0 {
            return None;
        }
        Some(Self::ALL[((position - 1) % 4) as usize])
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(AnswerKey::A),
            "b" => Ok(AnswerKey::B),
            "c" => Ok(AnswerKey::C),
            "d" => Ok(AnswerKey::D),
            other => Err(format!("unknown answer key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub b: String,
    #[serde(default)]
    pub c: String,
    #[serde(default)]
    pub d: String,
}

impl Answers {
    pub fn get(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::A => &self.a,
            AnswerKey::B => &self.b,
            AnswerKey::C => &self.c,
            AnswerKey::D => &self.d,
        }
    }
}

/// A multiple-choice question as composed in the admin console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question", alias = "text")]
    pub text: String,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub correct_answer: Option<AnswerKey>,
    /// Index of the team the question is addressed to, if any
    #[serde(default)]
    pub team: Option<i32>,
}

impl Question {
    /// Same checks as the admin console form: every field filled and a correct answer picked
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("Question text is required".to_string());
        }

        if let Some(missing) = AnswerKey::ALL
            .iter()
            .find(|key| self.answers.get(**key).trim().is_empty())
        {
            return Err(format!("Answer {} is required", missing.as_str().to_uppercase()));
        }

        if self.correct_answer.is_none() {
            return Err("A correct answer must be selected".to_string());
        }

        if matches!(self.team, Some(team) if team < 0) {
            return Err("Team index cannot be negative".to_string());
        }

        Ok(())
    }
}

/// A question waiting in the admin's queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedQuestion {
    pub id: i64,
    #[serde(flatten)]
    pub question: Question,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

/// Row shape of the `questions` table
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRecord {
    pub question_text: String,
    pub answers: Json<Answers>,
    pub correct_answer: Option<String>,
    pub team: Option<i32>,
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Question {
            text: record.question_text,
            answers: record.answers.0,
            correct_answer: record
                .correct_answer
                .as_deref()
                .and_then(|key| key.parse().ok()),
            team: record.team,
        }
    }
}

/// Row shape of the `question_queue` table
#[derive(Debug, Clone, FromRow)]
pub struct QueuedQuestionRecord {
    pub id: i64,
    pub question_text: String,
    pub answers: Json<Answers>,
    pub correct_answer: Option<String>,
    pub team: Option<i32>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl From<QueuedQuestionRecord> for QueuedQuestion {
    fn from(record: QueuedQuestionRecord) -> Self {
        QueuedQuestion {
            id: record.id,
            question: Question {
                text: record.question_text,
                answers: record.answers.0,
                correct_answer: record
                    .correct_answer
                    .as_deref()
                    .and_then(|key| key.parse().ok()),
                team: record.team,
            },
            is_used: record.is_used,
            created_at: record.created_at,
        }
    }
}
