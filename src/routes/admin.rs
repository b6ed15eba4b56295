use crate::{
    auth::{self, AdminUser},
    error::{AppError, Result},
    models::{Contestant, GameMode, ScoreboardData, ScoreboardUpdate},
    websocket::{broadcast_scoreboard, messages::ServerMessage},
    AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub passcode: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub id: i32,
    pub score: i32,
}

#[derive(Debug, Deserialize)]
pub struct RoundRequest {
    pub round: Option<i32>,
    pub mode: Option<GameMode>,
    /// Teams to show with the new round, cut to the mode; defaults to the visible contestants
    pub teams: Option<Vec<Contestant>>,
}

/// Exchange the admin passcode for a JWT
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if !auth::verify_credentials(&state.config.admin, &payload.username, &payload.passcode) {
        tracing::warn!("Failed admin login for {}", payload.username);
        return Err(AppError::Unauthorized);
    }

    let token = auth::generate_token(
        &payload.username,
        &state.config.security.jwt_secret,
        state.config.security.token_ttl_hours,
    )
    .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!("Admin {} logged in", payload.username);
    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}

pub async fn get_scoreboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Json<ScoreboardData> {
    Json(state.scoreboard.snapshot().await)
}

/// Replace the scoreboard and push it to every client
pub async fn update_scoreboard(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(update): Json<ScoreboardUpdate>,
) -> Result<Json<ScoreboardData>> {
    let data = state.scoreboard.update_scoreboard(update).await?;
    tracing::debug!("Scoreboard replaced by {}", admin.username);

    broadcast_scoreboard(&state, &data);
    Ok(Json(data))
}

pub async fn update_score(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<Contestant>> {
    let contestant = state
        .scoreboard
        .update_score(payload.id, payload.score)
        .await?
        .ok_or_else(|| AppError::NotFound("Contestant not found".to_string()))?;

    state.hub.broadcast(ServerMessage::ContestantUpdate {
        id: contestant.id,
        score: contestant.score,
    });

    Ok(Json(contestant))
}

/// Move to another round, optionally switching the display mode
pub async fn update_round(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<RoundRequest>,
) -> Result<Json<Value>> {
    let round = payload
        .round
        .ok_or_else(|| AppError::BadRequest("Round number is required".to_string()))?;

    let settings = state.scoreboard.update_settings(round, payload.mode).await?;
    let teams = match payload.teams {
        Some(mut teams) => {
            teams.truncate(settings.mode.contestant_count());
            teams
        }
        None => state.scoreboard.visible().await.contestants,
    };

    state.hub.broadcast(ServerMessage::RoundUpdated {
        round: settings.round,
        mode: settings.mode,
        teams,
    });

    Ok(Json(json!({
        "message": "Round updated successfully",
        "round": settings.round,
        "mode": settings.mode,
    })))
}
