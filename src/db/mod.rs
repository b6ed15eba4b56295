use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::Result,
    models::{Contestant, GameSettings, Question, QueuedQuestion},
};

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub async fn create_pool(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Persistence behind the scoreboard and question desk
#[async_trait]
pub trait ScoreboardStore: Send + Sync {
    /// Short name shown in health output
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    async fn load_settings(&self) -> Result<Option<GameSettings>>;
    async fn save_settings(&self, settings: &GameSettings) -> Result<()>;

    /// All contestants ordered by id
    async fn load_contestants(&self) -> Result<Vec<Contestant>>;
    /// Insert contestants with ids `0..names.len()`
    async fn seed_contestants(&self, names: &[String]) -> Result<Vec<Contestant>>;
    /// Insert a contestant with the next free id and a zero score
    async fn create_contestant(&self, name: &str) -> Result<Contestant>;
    /// Overwrite the settings and the full contestant list in one step.
    /// Contestants not in `contestants` are removed.
    async fn replace_scoreboard(
        &self,
        settings: &GameSettings,
        contestants: &[Contestant],
    ) -> Result<()>;
    /// Returns false if no contestant has this id
    async fn update_score(&self, id: i32, score: i32) -> Result<bool>;
    /// Returns false if no contestant has this id
    async fn delete_contestant(&self, id: i32) -> Result<bool>;

    async fn latest_question(&self) -> Result<Option<Question>>;
    async fn insert_question(&self, question: &Question, round: i32) -> Result<()>;

    async fn enqueue_question(&self, question: &Question) -> Result<QueuedQuestion>;
    /// Unused queued questions, oldest first
    async fn pending_questions(&self) -> Result<Vec<QueuedQuestion>>;
    /// Returns false if the question was already used or does not exist
    async fn mark_question_used(&self, id: i64) -> Result<bool>;
    /// Drop every unused queued question, returning how many were removed
    async fn clear_queue(&self) -> Result<u64>;
}
