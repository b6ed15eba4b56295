use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    config::GameConfig,
    db::ScoreboardStore,
    error::{AppError, Result},
    models::{Contestant, GameMode, GameSettings, ScoreboardData, ScoreboardUpdate},
};

/// Authoritative scoreboard state, written through to the store.
///
/// Reads are served from memory. Every write holds the lock for the
/// duration of its store calls, so concurrent admin edits are applied one
/// at a time and the last one wins.
pub struct ScoreboardModel {
    store: Arc<dyn ScoreboardStore>,
    data: RwLock<ScoreboardData>,
}

impl ScoreboardModel {
    /// Load settings and contestants, creating defaults on first start
    pub async fn initialize(store: Arc<dyn ScoreboardStore>, game: &GameConfig) -> Result<Self> {
        let settings = match store.load_settings().await? {
            Some(settings) => settings,
            None => {
                let defaults = GameSettings {
                    round: 1,
                    mode: game.default_mode,
                };
                store.save_settings(&defaults).await?;
                tracing::info!("Created default game settings");
                defaults
            }
        };

        let mut contestants = store.load_contestants().await?;
        if contestants.is_empty() {
            contestants = store.seed_contestants(&game.default_contestants).await?;
            tracing::info!("Seeded {} default contestants", contestants.len());
        }

        Ok(Self {
            store,
            data: RwLock::new(ScoreboardData {
                contestants,
                round: settings.round,
                mode: settings.mode,
            }),
        })
    }

    /// Everything, as the admin console sees it
    pub async fn snapshot(&self) -> ScoreboardData {
        self.data.read().await.clone()
    }

    /// Only what the displays show for the current mode
    pub async fn visible(&self) -> ScoreboardData {
        self.data.read().await.visible()
    }

    pub async fn settings(&self) -> GameSettings {
        self.data.read().await.settings()
    }

    pub async fn contestant(&self, id: i32) -> Option<Contestant> {
        self.data
            .read()
            .await
            .contestants
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Replace the whole scoreboard with what the admin sent.
    ///
    /// Contestants missing from the update are removed. The store is
    /// rewritten as one unit, so a failed write leaves both the store and
    /// the in-memory state as they were.
    pub async fn update_scoreboard(&self, update: ScoreboardUpdate) -> Result<ScoreboardData> {
        validate_round(update.round)?;
        if update.contestants.iter().any(|c| c.id < 0) {
            return Err(AppError::BadRequest(
                "Contestant ids must not be negative".to_string(),
            ));
        }

        let mut contestants: Vec<Contestant> = update
            .contestants
            .into_iter()
            .map(|input| input.normalize())
            .collect();
        contestants.sort_by_key(|c| c.id);
        contestants.dedup_by_key(|c| c.id);

        let settings = GameSettings {
            round: update.round,
            mode: update.mode,
        };

        let mut data = self.data.write().await;
        self.store.replace_scoreboard(&settings, &contestants).await?;

        *data = ScoreboardData {
            contestants,
            round: settings.round,
            mode: settings.mode,
        };

        tracing::info!(
            "Scoreboard updated: round {}, mode {}, {} contestants",
            data.round,
            data.mode.contestant_count(),
            data.contestants.len()
        );

        Ok(data.clone())
    }

    /// Set one contestant's score. Returns `None` for an unknown id.
    pub async fn update_score(&self, id: i32, score: i32) -> Result<Option<Contestant>> {
        let mut data = self.data.write().await;
        let Some(contestant) = data.contestants.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        self.store.update_score(id, score).await?;
        contestant.score = score;

        tracing::info!("Contestant {} score set to {}", id, score);
        Ok(Some(contestant.clone()))
    }

    /// Change the round, and the mode if one is given
    pub async fn update_settings(&self, round: i32, mode: Option<GameMode>) -> Result<GameSettings> {
        validate_round(round)?;

        let mut data = self.data.write().await;
        let settings = GameSettings {
            round,
            mode: mode.unwrap_or(data.mode),
        };

        self.store.save_settings(&settings).await?;
        data.round = settings.round;
        data.mode = settings.mode;

        tracing::info!(
            "Game settings updated: round {}, mode {}",
            settings.round,
            settings.mode.contestant_count()
        );
        Ok(settings)
    }

    pub async fn create_contestant(&self, name: &str) -> Result<Contestant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Contestant name is required".to_string()));
        }

        let mut data = self.data.write().await;
        if data.contestants.iter().any(|c| c.id == i32::MAX) {
            return Err(AppError::BadRequest("No contestant ids left".to_string()));
        }
        let contestant = self.store.create_contestant(name).await?;
        data.contestants.push(contestant.clone());
        data.contestants.sort_by_key(|c| c.id);

        tracing::info!("Created contestant {} ({})", contestant.name, contestant.id);
        Ok(contestant)
    }

    /// Remove a contestant and return the ones left
    pub async fn delete_contestant(&self, id: i32) -> Result<Vec<Contestant>> {
        let mut data = self.data.write().await;
        if !data.contestants.iter().any(|c| c.id == id) {
            return Err(AppError::NotFound("Contestant not found".to_string()));
        }

        self.store.delete_contestant(id).await?;
        data.contestants.retain(|c| c.id != id);

        tracing::info!("Deleted contestant {}", id);
        Ok(data.contestants.clone())
    }
}

fn validate_round(round: i32) -> Result<()> {
    if round < 1 {
        return Err(AppError::BadRequest(
            "Round must be a positive number".to_string(),
        ));
    }
    Ok(())
}
