use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    db::ScoreboardStore,
    error::{AppError, Result},
    models::{Question, QueuedQuestion},
};

/// Tracks the question on screen and the admin's queue of upcoming ones
pub struct QuestionDesk {
    store: Arc<dyn ScoreboardStore>,
    current: RwLock<Option<Question>>,
}

impl QuestionDesk {
    pub fn new(store: Arc<dyn ScoreboardStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// The question on screen, falling back to the most recently stored one
    pub async fn current(&self) -> Result<Option<Question>> {
        if let Some(question) = self.current.read().await.as_ref() {
            return Ok(Some(question.clone()));
        }

        let mut current = self.current.write().await;
        if current.is_none() {
            *current = self.store.latest_question().await?;
        }
        Ok(current.clone())
    }

    /// Store a question and make it the current one
    pub async fn publish(&self, question: Question, round: i32) -> Result<Question> {
        question.validate().map_err(AppError::BadRequest)?;

        let mut current = self.current.write().await;
        self.store.insert_question(&question, round).await?;
        *current = Some(question.clone());

        tracing::info!("Question published for round {}: {}", round, question.text);
        Ok(question)
    }

    pub async fn enqueue(&self, question: Question) -> Result<QueuedQuestion> {
        question.validate().map_err(AppError::BadRequest)?;

        let queued = self.store.enqueue_question(&question).await?;
        tracing::info!("Queued question {}: {}", queued.id, queued.question.text);
        Ok(queued)
    }

    pub async fn pending(&self) -> Result<Vec<QueuedQuestion>> {
        self.store.pending_questions().await
    }

    /// Publish the oldest unused queued question. `None` when the queue is empty.
    ///
    /// The question is only marked used once it has been stored as current,
    /// so a failed write leaves it at the head of the queue.
    pub async fn advance(&self, round: i32) -> Result<Option<Question>> {
        // Holding the write lock keeps two advances from taking the same head
        let mut current = self.current.write().await;
        let Some(next) = self.store.pending_questions().await?.into_iter().next() else {
            return Ok(None);
        };

        self.store.insert_question(&next.question, round).await?;
        self.store.mark_question_used(next.id).await?;
        *current = Some(next.question.clone());

        tracing::info!("Advanced to queued question {}", next.id);
        Ok(Some(next.question))
    }

    pub async fn clear_queue(&self) -> Result<u64> {
        let removed = self.store.clear_queue().await?;
        tracing::info!("Cleared {} queued questions", removed);
        Ok(removed)
    }
}
