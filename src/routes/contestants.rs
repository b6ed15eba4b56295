use crate::{
    auth::AdminUser,
    error::{AppError, Result},
    models::Contestant,
    websocket::{broadcast_scoreboard, messages::ServerMessage},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct NewContestant {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TeamScore {
    pub score: i32,
    /// Team list from the admin console, relayed to the widgets cut to the current mode
    pub teams: Option<Vec<Contestant>>,
}

/// Contestants shown on the displays for the current mode
pub async fn list_contestants(State(state): State<Arc<AppState>>) -> Json<Vec<Contestant>> {
    Json(state.scoreboard.visible().await.contestants)
}

pub async fn get_contestant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Contestant>> {
    state
        .scoreboard
        .contestant(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Contestant not found".to_string()))
}

pub async fn create_contestant(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<NewContestant>,
) -> Result<(StatusCode, Json<Contestant>)> {
    let contestant = state.scoreboard.create_contestant(&payload.name).await?;

    broadcast_scoreboard(&state, &state.scoreboard.snapshot().await);
    Ok((StatusCode::CREATED, Json(contestant)))
}

/// Returns the contestants that remain
pub async fn delete_contestant(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Contestant>>> {
    let remaining = state.scoreboard.delete_contestant(id).await?;

    broadcast_scoreboard(&state, &state.scoreboard.snapshot().await);
    Ok(Json(remaining))
}

/// Score change from the admin console, fanned out to the single-team widgets
pub async fn send_team_score(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<TeamScore>,
) -> Result<Json<Value>> {
    let contestant = state
        .scoreboard
        .update_score(id, payload.score)
        .await?
        .ok_or_else(|| AppError::NotFound("Contestant not found".to_string()))?;

    state.hub.broadcast(ServerMessage::ContestantUpdate {
        id: contestant.id,
        score: contestant.score,
    });

    if let Some(mut teams) = payload.teams {
        let mode = state.scoreboard.settings().await.mode;
        teams.truncate(mode.contestant_count());
        state.hub.broadcast(ServerMessage::TeamsData { teams, mode });
    }

    Ok(Json(json!({
        "success": true,
        "id": contestant.id,
        "score": contestant.score,
    })))
}
