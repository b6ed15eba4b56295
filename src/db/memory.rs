use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::ScoreboardStore;
use crate::{
    error::{AppError, Result},
    models::{Contestant, GameSettings, Question, QueuedQuestion},
};

#[derive(Default)]
struct Tables {
    settings: Option<GameSettings>,
    contestants: Vec<Contestant>,
    questions: Vec<(Question, i32)>,
    queue: Vec<QueuedQuestion>,
    next_queue_id: i64,
}

/// Process-local store used when no database is configured. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreboardStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<GameSettings>> {
        Ok(self.tables.lock().await.settings)
    }

    async fn save_settings(&self, settings: &GameSettings) -> Result<()> {
        self.tables.lock().await.settings = Some(*settings);
        Ok(())
    }

    async fn load_contestants(&self) -> Result<Vec<Contestant>> {
        let mut contestants = self.tables.lock().await.contestants.clone();
        contestants.sort_by_key(|c| c.id);
        Ok(contestants)
    }

    async fn seed_contestants(&self, names: &[String]) -> Result<Vec<Contestant>> {
        let mut tables = self.tables.lock().await;
        let seeded: Vec<Contestant> = names
            .iter()
            .enumerate()
            .map(|(id, name)| Contestant {
                id: id as i32,
                name: name.clone(),
                score: 0,
            })
            .collect();
        tables.contestants.extend(seeded.iter().cloned());
        Ok(seeded)
    }

    async fn create_contestant(&self, name: &str) -> Result<Contestant> {
        let mut tables = self.tables.lock().await;
        let id = match tables.contestants.iter().map(|c| c.id).max() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| AppError::BadRequest("No contestant ids left".to_string()))?,
            None => 0,
        };
        let contestant = Contestant {
            id,
            name: name.to_string(),
            score: 0,
        };
        tables.contestants.push(contestant.clone());
        Ok(contestant)
    }

    async fn replace_scoreboard(
        &self,
        settings: &GameSettings,
        contestants: &[Contestant],
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.settings = Some(*settings);
        tables.contestants = contestants.to_vec();
        Ok(())
    }

    async fn update_score(&self, id: i32, score: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.contestants.iter_mut().find(|c| c.id == id) {
            Some(contestant) => {
                contestant.score = score;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_contestant(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.contestants.len();
        tables.contestants.retain(|c| c.id != id);
        Ok(tables.contestants.len() != before)
    }

    async fn latest_question(&self) -> Result<Option<Question>> {
        let tables = self.tables.lock().await;
        Ok(tables.questions.last().map(|(question, _)| question.clone()))
    }

    async fn insert_question(&self, question: &Question, round: i32) -> Result<()> {
        self.tables
            .lock()
            .await
            .questions
            .push((question.clone(), round));
        Ok(())
    }

    async fn enqueue_question(&self, question: &Question) -> Result<QueuedQuestion> {
        let mut tables = self.tables.lock().await;
        tables.next_queue_id += 1;
        let queued = QueuedQuestion {
            id: tables.next_queue_id,
            question: question.clone(),
            is_used: false,
            created_at: Utc::now(),
        };
        tables.queue.push(queued.clone());
        Ok(queued)
    }

    async fn pending_questions(&self) -> Result<Vec<QueuedQuestion>> {
        let tables = self.tables.lock().await;
        Ok(tables.queue.iter().filter(|q| !q.is_used).cloned().collect())
    }

    async fn mark_question_used(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.queue.iter_mut().find(|q| q.id == id && !q.is_used) {
            Some(queued) => {
                queued.is_used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_queue(&self) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let before = tables.queue.len();
        tables.queue.retain(|q| q.is_used);
        Ok((before - tables.queue.len()) as u64)
    }
}
