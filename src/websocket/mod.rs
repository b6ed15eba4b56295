pub mod handler;
pub mod hub;
pub mod messages;

pub use handler::handle_websocket;

use crate::{error::Result, models::ScoreboardData, AppState};
use hub::ClientRole;
use messages::ServerMessage;

/// Admins get the full scoreboard, displays the mode-truncated teams
pub fn broadcast_scoreboard(state: &AppState, data: &ScoreboardData) {
    state.hub.broadcast_to(ClientRole::Admin, ServerMessage::ScoreboardData(data.clone()));
    state.hub.broadcast_to(ClientRole::Display, ServerMessage::teams(data));
}

/// Push the pending queue to every admin console
pub async fn broadcast_queue(state: &AppState) -> Result<()> {
    let questions = state.questions.pending().await?;
    state.hub.broadcast_to(ClientRole::Admin, ServerMessage::QueueData { questions });
    Ok(())
}
