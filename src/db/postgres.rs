use async_trait::async_trait;
use sqlx::PgPool;

use super::{queries, ScoreboardStore};
use crate::{
    error::Result,
    models::{Contestant, GameSettings, Question, QueuedQuestion},
};

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreboardStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        Ok(queries::ping(&self.pool).await?)
    }

    async fn load_settings(&self) -> Result<Option<GameSettings>> {
        let record = queries::get_settings(&self.pool).await?;
        Ok(record.map(|r| r.into_settings()))
    }

    async fn save_settings(&self, settings: &GameSettings) -> Result<()> {
        Ok(queries::upsert_settings(&self.pool, settings).await?)
    }

    async fn load_contestants(&self) -> Result<Vec<Contestant>> {
        Ok(queries::get_contestants(&self.pool).await?)
    }

    async fn seed_contestants(&self, names: &[String]) -> Result<Vec<Contestant>> {
        let mut contestants = Vec::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            let contestant =
                queries::insert_contestant_with_id(&self.pool, id as i32, name).await?;
            contestants.push(contestant);
        }
        Ok(contestants)
    }

    async fn create_contestant(&self, name: &str) -> Result<Contestant> {
        Ok(queries::insert_contestant(&self.pool, name).await?)
    }

    async fn replace_scoreboard(
        &self,
        settings: &GameSettings,
        contestants: &[Contestant],
    ) -> Result<()> {
        Ok(queries::replace_scoreboard(&self.pool, settings, contestants).await?)
    }

    async fn update_score(&self, id: i32, score: i32) -> Result<bool> {
        let updated = queries::update_contestant_score(&self.pool, id, score).await?;
        Ok(updated > 0)
    }

    async fn delete_contestant(&self, id: i32) -> Result<bool> {
        let deleted = queries::delete_contestant(&self.pool, id).await?;
        Ok(deleted > 0)
    }

    async fn latest_question(&self) -> Result<Option<Question>> {
        let record = queries::get_latest_question(&self.pool).await?;
        Ok(record.map(Question::from))
    }

    async fn insert_question(&self, question: &Question, round: i32) -> Result<()> {
        Ok(queries::insert_question(&self.pool, question, round).await?)
    }

    async fn enqueue_question(&self, question: &Question) -> Result<QueuedQuestion> {
        let record = queries::insert_queued_question(&self.pool, question).await?;
        Ok(record.into())
    }

    async fn pending_questions(&self) -> Result<Vec<QueuedQuestion>> {
        let records = queries::get_pending_questions(&self.pool).await?;
        Ok(records.into_iter().map(QueuedQuestion::from).collect())
    }

    async fn mark_question_used(&self, id: i64) -> Result<bool> {
        let updated = queries::mark_question_used(&self.pool, id).await?;
        Ok(updated > 0)
    }

    async fn clear_queue(&self) -> Result<u64> {
        Ok(queries::delete_pending_questions(&self.pool).await?)
    }
}
