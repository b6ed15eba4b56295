use crate::{
    auth,
    error::{AppError, Result},
    websocket::{
        broadcast_queue, broadcast_scoreboard,
        hub::ClientRole,
        messages::{ClientMessage, ServerMessage},
    },
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Admin JWT; without it the socket joins as a display
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let admin = params
        .token
        .as_deref()
        .and_then(|token| auth::decode_token(token, &state.config.security.jwt_secret));

    let role = match admin {
        Some(admin) => {
            tracing::info!("WebSocket upgrade authenticated for admin: {}", admin.username);
            ClientRole::Admin
        }
        None => ClientRole::Display,
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, role))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, role: ClientRole) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    let conn_id = state.hub.register(tx.clone(), role);
    tracing::info!("Client connected: {} ({:?})", conn_id, role);

    // Every new subscriber starts from the current scoreboard
    let snapshot = state.scoreboard.snapshot().await;
    let _ = tx.send(ServerMessage::teams(&snapshot)).await;
    if role == ClientRole::Admin {
        let _ = tx.send(ServerMessage::ScoreboardData(snapshot)).await;
    }

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from the client
    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &state_for_recv, conn_id).await
                        {
                            tracing::warn!("Error handling message from {}: {}", conn_id, e);
                            let _ = tx.send(ServerMessage::error(e.public_message())).await;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse message from {}: {}", conn_id, e);
                        let _ = tx
                            .send(ServerMessage::error(format!("Invalid message format: {}", e)))
                            .await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client {} sent close frame", conn_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    state.hub.unregister(&conn_id);
    tracing::info!("Client disconnected: {}", conn_id);
}

/// Apply one client event and fan out the result
pub async fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    conn_id: Uuid,
) -> Result<()> {
    if !msg.is_public() && !state.hub.is_admin(&conn_id) {
        tracing::warn!(
            "Rejected {} from connection {} without admin login",
            msg.name(),
            conn_id
        );
        return Err(AppError::Unauthorized);
    }

    match msg {
        ClientMessage::AdminLogin { username, passcode } => {
            let success = auth::verify_credentials(&state.config.admin, &username, &passcode);
            tracing::info!(
                "Login attempt from {}: {}",
                conn_id,
                if success { "Success" } else { "Failed" }
            );

            let token = if success {
                state.hub.promote(&conn_id);
                let token = auth::generate_token(
                    &username,
                    &state.config.security.jwt_secret,
                    state.config.security.token_ttl_hours,
                )
                .map_err(|e| AppError::Internal(e.into()))?;
                Some(token)
            } else {
                None
            };

            state
                .hub
                .send_to(&conn_id, ServerMessage::LoginResult { success, token })
                .await;
        }
        ClientMessage::GetScoreboard => {
            let data = state.scoreboard.snapshot().await;
            let reply = if state.hub.is_admin(&conn_id) {
                ServerMessage::ScoreboardData(data)
            } else {
                ServerMessage::teams(&data)
            };
            state.hub.send_to(&conn_id, reply).await;
        }
        ClientMessage::UpdateScore { id, score } => {
            let contestant = state
                .scoreboard
                .update_score(id, score)
                .await?
                .ok_or_else(|| AppError::NotFound("Contestant not found".to_string()))?;

            state.hub.broadcast(ServerMessage::ContestantUpdate {
                id: contestant.id,
                score: contestant.score,
            });
        }
        ClientMessage::UpdateScoreboard(update) => {
            let data = state.scoreboard.update_scoreboard(update).await?;
            broadcast_scoreboard(state, &data);
        }
        ClientMessage::UpdateQuestion(question) => {
            let round = state.scoreboard.settings().await.round;
            let question = state.questions.publish(question, round).await?;
            state.hub.broadcast(ServerMessage::QuestionUpdate { question });
        }
        ClientMessage::HighlightAnswer(highlight) => {
            state.hub.broadcast(ServerMessage::QuestionHighlight(highlight));
        }
        ClientMessage::ResetHighlights => {
            state.hub.broadcast(ServerMessage::QuestionResetHighlights);
        }
        ClientMessage::QueueQuestion(question) => {
            state.questions.enqueue(question).await?;
            broadcast_queue(state).await?;
        }
        ClientMessage::NextQuestion => {
            let round = state.scoreboard.settings().await.round;
            let question = state
                .questions
                .advance(round)
                .await?
                .ok_or_else(|| AppError::NotFound("Question queue is empty".to_string()))?;

            state.hub.broadcast(ServerMessage::QuestionUpdate { question });
            broadcast_queue(state).await?;
        }
        ClientMessage::ClearQueue => {
            state.questions.clear_queue().await?;
            broadcast_queue(state).await?;
        }
        ClientMessage::GetQueue => {
            let questions = state.questions.pending().await?;
            state
                .hub
                .send_to(&conn_id, ServerMessage::QueueData { questions })
                .await;
        }
    }

    Ok(())
}
