use sqlx::{types::Json, PgExecutor, PgPool, Result};

use crate::models::{
    Contestant, GameSettings, GameSettingsRecord, Question, QuestionRecord, QueuedQuestionRecord,
};

/// The settings table only ever holds this row
const SETTINGS_ROW_ID: i32 = 1;

// Settings queries
pub async fn get_settings(pool: &PgPool) -> Result<Option<GameSettingsRecord>> {
    sqlx::query_as::<_, GameSettingsRecord>(
        "SELECT mode, current_round FROM game_settings WHERE id = $1",
    )
    .bind(SETTINGS_ROW_ID)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_settings<'e, E>(executor: E, settings: &GameSettings) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO game_settings (id, mode, current_round)
        VALUES ($1, $2, $3)
        ON CONFLICT (id)
        DO UPDATE SET
            mode = EXCLUDED.mode,
            current_round = EXCLUDED.current_round,
            updated_at = NOW()
        "#,
    )
    .bind(SETTINGS_ROW_ID)
    .bind(settings.mode.contestant_count() as i16)
    .bind(settings.round)
    .execute(executor)
    .await?;

    Ok(())
}

// Contestant queries
pub async fn get_contestants(pool: &PgPool) -> Result<Vec<Contestant>> {
    sqlx::query_as::<_, Contestant>("SELECT id, name, score FROM contestants ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn insert_contestant_with_id(pool: &PgPool, id: i32, name: &str) -> Result<Contestant> {
    sqlx::query_as::<_, Contestant>(
        r#"
        INSERT INTO contestants (id, name, score)
        VALUES ($1, $2, 0)
        RETURNING id, name, score
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn insert_contestant(pool: &PgPool, name: &str) -> Result<Contestant> {
    sqlx::query_as::<_, Contestant>(
        r#"
        INSERT INTO contestants (id, name, score)
        VALUES ((SELECT COALESCE(MAX(id), -1) + 1 FROM contestants), $1, 0)
        RETURNING id, name, score
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
}

async fn upsert_contestant<'e, E>(executor: E, contestant: &Contestant) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO contestants (id, name, score)
        VALUES ($1, $2, $3)
        ON CONFLICT (id)
        DO UPDATE SET
            name = EXCLUDED.name,
            score = EXCLUDED.score,
            updated_at = NOW()
        "#,
    )
    .bind(contestant.id)
    .bind(&contestant.name)
    .bind(contestant.score)
    .execute(executor)
    .await?;

    Ok(())
}

/// Settings and contestants are written in one transaction
pub async fn replace_scoreboard(
    pool: &PgPool,
    settings: &GameSettings,
    contestants: &[Contestant],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    upsert_settings(&mut *tx, settings).await?;

    let ids: Vec<i32> = contestants.iter().map(|c| c.id).collect();
    sqlx::query("DELETE FROM contestants WHERE id <> ALL($1)")
        .bind(ids)
        .execute(&mut *tx)
        .await?;

    for contestant in contestants {
        upsert_contestant(&mut *tx, contestant).await?;
    }

    tx.commit().await
}

pub async fn update_contestant_score(pool: &PgPool, id: i32, score: i32) -> Result<u64> {
    let result =
        sqlx::query("UPDATE contestants SET score = $1, updated_at = NOW() WHERE id = $2")
            .bind(score)
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete_contestant(pool: &PgPool, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM contestants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// Question queries
pub async fn get_latest_question(pool: &PgPool) -> Result<Option<QuestionRecord>> {
    sqlx::query_as::<_, QuestionRecord>(
        r#"
        SELECT question_text, answers, correct_answer, team
        FROM questions
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await
}

pub async fn insert_question(pool: &PgPool, question: &Question, round: i32) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO questions (question_text, answers, correct_answer, team, round)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&question.text)
    .bind(Json(&question.answers))
    .bind(question.correct_answer.map(|key| key.as_str()))
    .bind(question.team)
    .bind(round)
    .execute(pool)
    .await?;

    Ok(())
}

// Question queue queries
pub async fn insert_queued_question(
    pool: &PgPool,
    question: &Question,
) -> Result<QueuedQuestionRecord> {
    sqlx::query_as::<_, QueuedQuestionRecord>(
        r#"
        INSERT INTO question_queue (question_text, answers, correct_answer, team)
        VALUES ($1, $2, $3, $4)
        RETURNING id, question_text, answers, correct_answer, team, is_used, created_at
        "#,
    )
    .bind(&question.text)
    .bind(Json(&question.answers))
    .bind(question.correct_answer.map(|key| key.as_str()))
    .bind(question.team)
    .fetch_one(pool)
    .await
}

pub async fn get_pending_questions(pool: &PgPool) -> Result<Vec<QueuedQuestionRecord>> {
    sqlx::query_as::<_, QueuedQuestionRecord>(
        r#"
        SELECT id, question_text, answers, correct_answer, team, is_used, created_at
        FROM question_queue
        WHERE is_used = FALSE
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn mark_question_used(pool: &PgPool, id: i64) -> Result<u64> {
    let result =
        sqlx::query("UPDATE question_queue SET is_used = TRUE WHERE id = $1 AND is_used = FALSE")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete_pending_questions(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM question_queue WHERE is_used = FALSE")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
