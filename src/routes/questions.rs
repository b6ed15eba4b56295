use crate::{
    auth::AdminUser,
    error::{AppError, Result},
    models::{AnswerCue, ChoicesCue, FactCue, Question, QuestionCue, QueuedQuestion},
    websocket::{broadcast_queue, messages::ServerMessage},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn get_current_question(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let question = state.questions.current().await?;
    Ok(Json(json!({ "question": question })))
}

/// Put a question on screen immediately
pub async fn publish_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(question): Json<Question>,
) -> Result<Json<Value>> {
    let round = state.scoreboard.settings().await.round;
    let question = state.questions.publish(question, round).await?;

    state.hub.broadcast(ServerMessage::QuestionUpdate {
        question: question.clone(),
    });

    Ok(Json(json!({ "question": question })))
}

pub async fn get_queue(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Value>> {
    let questions = state.questions.pending().await?;
    Ok(Json(json!({ "questions": questions })))
}

pub async fn enqueue_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(question): Json<Question>,
) -> Result<(StatusCode, Json<QueuedQuestion>)> {
    let queued = state.questions.enqueue(question).await?;
    broadcast_queue(&state).await?;
    Ok((StatusCode::CREATED, Json(queued)))
}

/// Publish the oldest queued question
pub async fn next_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Value>> {
    let round = state.scoreboard.settings().await.round;
    let question = state
        .questions
        .advance(round)
        .await?
        .ok_or_else(|| AppError::NotFound("Question queue is empty".to_string()))?;

    state.hub.broadcast(ServerMessage::QuestionUpdate {
        question: question.clone(),
    });
    broadcast_queue(&state).await?;

    Ok(Json(json!({ "question": question })))
}

pub async fn clear_queue(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<Value>> {
    let removed = state.questions.clear_queue().await?;
    broadcast_queue(&state).await?;
    Ok(Json(json!({ "success": true, "removed": removed })))
}

// Display cues. Nothing here is stored; each request becomes one broadcast.

fn relay(state: &AppState, message: ServerMessage) -> Json<Value> {
    let delivered = state.hub.broadcast(message);
    Json(json!({ "success": true, "delivered": delivered }))
}

fn check_question_cue(cue: &QuestionCue) -> Result<()> {
    if cue.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question text is required".to_string()));
    }
    Ok(())
}

fn check_answer_cue(cue: &AnswerCue) -> Result<()> {
    if cue.answer_id.key().is_none() {
        return Err(AppError::BadRequest("Invalid answer id".to_string()));
    }
    Ok(())
}

fn check_fact_cue(cue: &FactCue) -> Result<()> {
    if cue.fact.trim().is_empty() {
        return Err(AppError::BadRequest("Fact text is required".to_string()));
    }
    Ok(())
}

pub async fn display_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<QuestionCue>,
) -> Result<Json<Value>> {
    check_question_cue(&cue)?;
    Ok(relay(&state, ServerMessage::QuestionDisplay(cue)))
}

pub async fn change_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<QuestionCue>,
) -> Result<Json<Value>> {
    check_question_cue(&cue)?;
    Ok(relay(&state, ServerMessage::QuestionChange(cue)))
}

/// Switch the overlay to free-response layout
pub async fn format_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<QuestionCue>,
) -> Result<Json<Value>> {
    check_question_cue(&cue)?;
    Ok(relay(&state, ServerMessage::QuestionFreeResponse(cue)))
}

pub async fn show_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Json<Value> {
    relay(&state, ServerMessage::QuestionShow)
}

pub async fn hide_question(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Json<Value> {
    relay(&state, ServerMessage::QuestionHide)
}

pub async fn reveal_choices(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<ChoicesCue>,
) -> Json<Value> {
    relay(&state, ServerMessage::ChoicesReveal(cue))
}

pub async fn reveal_answer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<AnswerCue>,
) -> Result<Json<Value>> {
    check_answer_cue(&cue)?;
    Ok(relay(&state, ServerMessage::AnswerReveal(cue)))
}

pub async fn highlight_answer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<AnswerCue>,
) -> Result<Json<Value>> {
    check_answer_cue(&cue)?;
    Ok(relay(&state, ServerMessage::AnswerHighlight(cue)))
}

pub async fn reset_answer(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Json<Value> {
    relay(&state, ServerMessage::AnswerReset)
}

pub async fn display_fact(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<FactCue>,
) -> Result<Json<Value>> {
    check_fact_cue(&cue)?;
    Ok(relay(&state, ServerMessage::FactDisplay(cue)))
}

pub async fn change_fact(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<FactCue>,
) -> Result<Json<Value>> {
    check_fact_cue(&cue)?;
    Ok(relay(&state, ServerMessage::FactChange(cue)))
}

pub async fn reveal_fact(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(cue): Json<FactCue>,
) -> Result<Json<Value>> {
    check_fact_cue(&cue)?;
    Ok(relay(&state, ServerMessage::FactReveal(cue)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{AnswerKey, AnswerRef, Answers},
        test_state,
        websocket::hub::ClientRole,
    };
    use tokio::sync::mpsc;

    fn admin() -> AdminUser {
        AdminUser {
            username: "admin".to_string(),
        }
    }

    fn question(text: &str) -> Question {
        Question {
            text: text.to_string(),
            answers: Answers {
                a: "Coffee".into(),
                b: "Tea".into(),
                c: "Juice".into(),
                d: "Water".into(),
            },
            correct_answer: Some(AnswerKey::A),
            team: Some(1),
        }
    }

    fn answer_cue(answer_id: AnswerRef) -> AnswerCue {
        AnswerCue {
            answer_id,
            answer_text: None,
            team: None,
        }
    }

    #[tokio::test]
    async fn test_publish_then_current() {
        let state = test_state().await;
        let (tx, mut rx) = mpsc::channel(4);
        state.hub.register(tx, ClientRole::Display);

        publish_question(State(state.clone()), admin(), Json(question("Morning drink?")))
            .await
            .unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::QuestionUpdate { .. })
        ));
        let Json(body) = get_current_question(State(state)).await.unwrap();
        assert_eq!(body["question"]["question"], "Morning drink?");
    }

    #[tokio::test]
    async fn test_current_is_null_before_any_question() {
        let state = test_state().await;
        let Json(body) = get_current_question(State(state)).await.unwrap();
        assert!(body["question"].is_null());
    }

    #[tokio::test]
    async fn test_publish_rejects_missing_answer() {
        let state = test_state().await;
        let mut incomplete = question("Half");
        incomplete.correct_answer = None;

        let result = publish_question(State(state), admin(), Json(incomplete)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_queue_endpoints_notify_admins() {
        let state = test_state().await;
        let (tx, mut admin_rx) = mpsc::channel(8);
        state.hub.register(tx, ClientRole::Admin);

        let (status, Json(queued)) =
            enqueue_question(State(state.clone()), admin(), Json(question("Queued")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(!queued.is_used);

        match admin_rx.recv().await {
            Some(ServerMessage::QueueData { questions }) => assert_eq!(questions.len(), 1),
            other => panic!("unexpected message: {:?}", other),
        }

        let Json(body) = next_question(State(state.clone()), admin()).await.unwrap();
        assert_eq!(body["question"]["question"], "Queued");

        let Json(queue) = get_queue(State(state.clone()), admin()).await.unwrap();
        assert_eq!(queue["questions"], json!([]));

        let empty = next_question(State(state), admin()).await;
        assert!(matches!(empty, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_clear_queue_reports_count() {
        let state = test_state().await;
        for text in ["one", "two"] {
            enqueue_question(State(state.clone()), admin(), Json(question(text)))
                .await
                .unwrap();
        }

        let Json(body) = clear_queue(State(state), admin()).await.unwrap();
        assert_eq!(body["removed"], 2);
    }

    #[tokio::test]
    async fn test_format_emits_free_response() {
        let state = test_state().await;
        let (tx, mut rx) = mpsc::channel(4);
        state.hub.register(tx, ClientRole::Display);

        let cue = QuestionCue {
            question: "Describe your first date".to_string(),
            round_id: Some(2),
            is_free_response: true,
            team: None,
        };
        let Json(body) = format_question(State(state), admin(), Json(cue.clone()))
            .await
            .unwrap();

        assert_eq!(body["delivered"], 1);
        assert_eq!(
            rx.recv().await,
            Some(ServerMessage::QuestionFreeResponse(cue))
        );
    }

    #[tokio::test]
    async fn test_answer_cue_accepts_letter_and_position() {
        let state = test_state().await;

        assert!(reveal_answer(
            State(state.clone()),
            admin(),
            Json(answer_cue(AnswerRef::Letter("C".to_string())))
        )
        .await
        .is_ok());
        assert!(highlight_answer(
            State(state.clone()),
            admin(),
            Json(answer_cue(AnswerRef::Position(6)))
        )
        .await
        .is_ok());
    }

    #[tokio::test]
    async fn test_answer_cue_rejects_unknown_id() {
        let state = test_state().await;

        let letter = reveal_answer(
            State(state.clone()),
            admin(),
            Json(answer_cue(AnswerRef::Letter("z".to_string()))),
        )
        .await;
        assert!(matches!(letter, Err(AppError::BadRequest(_))));

        let zero = highlight_answer(State(state), admin(), Json(answer_cue(AnswerRef::Position(0))))
            .await;
        assert!(matches!(zero, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unit_cues_are_relayed() {
        let state = test_state().await;
        let (tx, mut rx) = mpsc::channel(4);
        state.hub.register(tx, ClientRole::Display);

        show_question(State(state.clone()), admin()).await;
        hide_question(State(state.clone()), admin()).await;
        reset_answer(State(state), admin()).await;

        assert_eq!(rx.recv().await, Some(ServerMessage::QuestionShow));
        assert_eq!(rx.recv().await, Some(ServerMessage::QuestionHide));
        assert_eq!(rx.recv().await, Some(ServerMessage::AnswerReset));
    }

    #[tokio::test]
    async fn test_fact_requires_text() {
        let state = test_state().await;
        let cue = FactCue {
            fact: "  ".to_string(),
            answer: None,
            team: None,
        };

        let result = display_fact(State(state), admin(), Json(cue)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
