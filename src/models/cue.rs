//! Payloads relayed to the question overlay. The server does not keep any of
//! these; it only checks their shape before broadcasting.

use serde::{Deserialize, Serialize};

use super::question::{AnswerKey, Answers};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCue {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<i32>,
    #[serde(default)]
    pub is_free_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicesCue {
    pub choices: Answers,
}

/// Reference to an answer: either its letter or its 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerRef {
    Position(u32),
    Letter(String),
}

impl AnswerRef {
    pub fn key(&self) -> Option<AnswerKey> {
        match self {
            AnswerRef::Position(position) => AnswerKey::from_position(*position),
            AnswerRef::Letter(letter) => letter.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCue {
    pub answer_id: AnswerRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCue {
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<i32>,
}

/// Admin request to mark the correct answer on the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub correct_answer: AnswerKey,
    #[serde(default)]
    pub show_wrong: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_ref_from_letter() {
        let cue: AnswerCue = serde_json::from_str(r#"{"answerId": "B"}"#).unwrap();
        assert_eq!(cue.answer_id.key(), Some(AnswerKey::B));
    }

    #[test]
    fn test_answer_ref_from_position() {
        let cue: AnswerCue =
            serde_json::from_str(r#"{"answerId": 7, "answerText": "Paris"}"#).unwrap();
        assert_eq!(cue.answer_id.key(), Some(AnswerKey::C));
        assert_eq!(cue.answer_text.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_answer_ref_unresolvable() {
        assert_eq!(AnswerRef::Letter("ab".to_string()).key(), None);
        assert_eq!(AnswerRef::Position(0).key(), None);
    }

    #[test]
    fn test_question_cue_defaults() {
        let cue: QuestionCue = serde_json::from_str(r#"{"question": "Who proposed?"}"#).unwrap();
        assert!(!cue.is_free_response);
        assert!(cue.round_id.is_none());

        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["isFreeResponse"], false);
        assert!(json.get("roundId").is_none());
    }

    #[test]
    fn test_highlight_payload() {
        let highlight: Highlight =
            serde_json::from_str(r#"{"correctAnswer": "a", "showWrong": true}"#).unwrap();
        assert_eq!(highlight.correct_answer, AnswerKey::A);
        assert!(highlight.show_wrong);
    }
}
