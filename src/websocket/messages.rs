use serde::{Deserialize, Serialize};

use crate::models::{
    AnswerCue, ChoicesCue, Contestant, FactCue, GameMode, Highlight, Question, QuestionCue,
    QueuedQuestion, ScoreboardData, ScoreboardUpdate,
};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "adminLogin")]
    AdminLogin { username: String, passcode: String },
    #[serde(rename = "getScoreboard")]
    GetScoreboard,
    #[serde(rename = "updateScore")]
    UpdateScore { id: i32, score: i32 },
    #[serde(rename = "updateScoreboard")]
    UpdateScoreboard(ScoreboardUpdate),
    #[serde(rename = "updateQuestion")]
    UpdateQuestion(Question),
    #[serde(rename = "highlightAnswer")]
    HighlightAnswer(Highlight),
    #[serde(rename = "resetHighlights")]
    ResetHighlights,
    #[serde(rename = "queueQuestion")]
    QueueQuestion(Question),
    #[serde(rename = "nextQuestion")]
    NextQuestion,
    #[serde(rename = "clearQueue")]
    ClearQueue,
    #[serde(rename = "getQueue")]
    GetQueue,
}

impl ClientMessage {
    /// Events a display client may send without logging in
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            ClientMessage::AdminLogin { .. } | ClientMessage::GetScoreboard
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::AdminLogin { .. } => "adminLogin",
            ClientMessage::GetScoreboard => "getScoreboard",
            ClientMessage::UpdateScore { .. } => "updateScore",
            ClientMessage::UpdateScoreboard(_) => "updateScoreboard",
            ClientMessage::UpdateQuestion(_) => "updateQuestion",
            ClientMessage::HighlightAnswer(_) => "highlightAnswer",
            ClientMessage::ResetHighlights => "resetHighlights",
            ClientMessage::QueueQuestion(_) => "queueQuestion",
            ClientMessage::NextQuestion => "nextQuestion",
            ClientMessage::ClearQueue => "clearQueue",
            ClientMessage::GetQueue => "getQueue",
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "login:result")]
    LoginResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Full admin view
    #[serde(rename = "scoreboardData")]
    ScoreboardData(ScoreboardData),
    /// Mode-truncated display view
    #[serde(rename = "scoreboard:data")]
    TeamsData { teams: Vec<Contestant>, mode: GameMode },
    #[serde(rename = "contestant:update")]
    ContestantUpdate { id: i32, score: i32 },
    #[serde(rename = "round:updated")]
    RoundUpdated {
        round: i32,
        mode: GameMode,
        teams: Vec<Contestant>,
    },
    #[serde(rename = "question:update")]
    QuestionUpdate { question: Question },
    #[serde(rename = "question:highlight")]
    QuestionHighlight(Highlight),
    #[serde(rename = "question:reset-highlights")]
    QuestionResetHighlights,
    #[serde(rename = "question:display")]
    QuestionDisplay(QuestionCue),
    #[serde(rename = "question:change")]
    QuestionChange(QuestionCue),
    #[serde(rename = "question:show")]
    QuestionShow,
    #[serde(rename = "question:hide")]
    QuestionHide,
    #[serde(rename = "question:free_response")]
    QuestionFreeResponse(QuestionCue),
    #[serde(rename = "choices:reveal")]
    ChoicesReveal(ChoicesCue),
    #[serde(rename = "answer:reveal")]
    AnswerReveal(AnswerCue),
    #[serde(rename = "answer:highlight")]
    AnswerHighlight(AnswerCue),
    #[serde(rename = "answer:reset")]
    AnswerReset,
    #[serde(rename = "fact:display")]
    FactDisplay(FactCue),
    #[serde(rename = "fact:change")]
    FactChange(FactCue),
    #[serde(rename = "fact:reveal")]
    FactReveal(FactCue),
    #[serde(rename = "queue:data")]
    QueueData { questions: Vec<QueuedQuestion> },
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn teams(data: &ScoreboardData) -> Self {
        ServerMessage::TeamsData {
            teams: data.visible_contestants(),
            mode: data.mode,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerKey;

    #[test]
    fn test_parse_admin_login() {
        let json = r#"{"event": "adminLogin", "data": {"username": "admin", "passcode": "pw"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        assert!(matches!(
            msg,
            ClientMessage::AdminLogin { ref username, .. } if username == "admin"
        ));
        assert!(msg.is_public());
    }

    #[test]
    fn test_parse_event_without_data() {
        let msg: ClientMessage = serde_json::from_str(r#"{"event": "getScoreboard"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::GetScoreboard));

        let msg: ClientMessage = serde_json::from_str(r#"{"event": "resetHighlights"}"#).unwrap();
        assert!(!msg.is_public());
        assert_eq!(msg.name(), "resetHighlights");
    }

    #[test]
    fn test_parse_update_scoreboard() {
        let json = r#"{
            "event": "updateScoreboard",
            "data": {
                "contestants": [{"id": 0, "name": "A", "score": 3}, {"id": 1}],
                "round": 2,
                "mode": 2
            }
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();

        match msg {
            ClientMessage::UpdateScoreboard(update) => {
                assert_eq!(update.contestants.len(), 2);
                assert_eq!(update.round, 2);
                assert_eq!(update.mode, GameMode::Two);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_event() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"event": "dropTables"}"#).is_err());
    }

    #[test]
    fn test_serialize_contestant_update() {
        let msg = ServerMessage::ContestantUpdate { id: 1, score: 40 };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["event"], "contestant:update");
        assert_eq!(json["data"]["id"], 1);
        assert_eq!(json["data"]["score"], 40);
    }

    #[test]
    fn test_serialize_unit_event() {
        let json = serde_json::to_value(ServerMessage::QuestionResetHighlights).unwrap();
        assert_eq!(json["event"], "question:reset-highlights");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_serialize_highlight() {
        let msg = ServerMessage::QuestionHighlight(Highlight {
            correct_answer: AnswerKey::D,
            show_wrong: true,
        });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["event"], "question:highlight");
        assert_eq!(json["data"]["correctAnswer"], "d");
        assert_eq!(json["data"]["showWrong"], true);
    }

    #[test]
    fn test_teams_view_is_truncated() {
        let data = ScoreboardData {
            contestants: (0..3)
                .map(|id| Contestant {
                    id,
                    name: format!("T{}", id),
                    score: 0,
                })
                .collect(),
            round: 1,
            mode: GameMode::Two,
        };

        match ServerMessage::teams(&data) {
            ServerMessage::TeamsData { teams, mode } => {
                assert_eq!(teams.len(), 2);
                assert_eq!(mode, GameMode::Two);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_login_result_omits_missing_token() {
        let json = serde_json::to_value(ServerMessage::LoginResult {
            success: false,
            token: None,
        })
        .unwrap();

        assert_eq!(json["data"]["success"], false);
        assert!(json["data"].get("token").is_none());
    }
}
