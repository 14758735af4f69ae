use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{Evaluation, InterviewSession, InterviewSessionRow, NewSession};
use crate::store::{not_found, SessionStore};

/// Session store backed by the `interview_sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, new: NewSession) -> Result<InterviewSession, AppError> {
        let session = InterviewSession::new(new);
        let row = InterviewSessionRow::from(&session);

        sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (id, participant, role, topics, questions, answers, reviews,
                 total_score, overall_review, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.id)
        .bind(&row.participant)
        .bind(&row.role)
        .bind(&row.topics)
        .bind(&row.questions)
        .bind(&row.answers)
        .bind(&row.reviews)
        .bind(row.total_score)
        .bind(&row.overall_review)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        info!(
            "Created interview session {} with {} questions for {}",
            session.id(),
            session.questions().len(),
            session.participant()
        );
        Ok(session)
    }

    async fn get(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            "SELECT * FROM interview_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InterviewSession::try_from).transpose()
    }

    async fn record_answer(&self, id: Uuid, index: usize, answer: String) -> Result<(), AppError> {
        let index = i32::try_from(index)
            .map_err(|_| AppError::Validation(format!("answer index {index} is out of range")))?;

        // Single-slot jsonb_set so concurrent turns never rewrite each other's slots.
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET answers = jsonb_set(answers, ARRAY[$2::text], to_jsonb($3::text)),
                updated_at = NOW()
            WHERE id = $1 AND $2 >= 0 AND $2 < jsonb_array_length(answers)
            "#,
        )
        .bind(id)
        .bind(index)
        .bind(&answer)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get(id).await? {
                Some(session) => Err(AppError::Validation(format!(
                    "answer index {index} is out of range for a {}-question interview",
                    session.questions().len()
                ))),
                None => Err(not_found(id)),
            };
        }
        Ok(())
    }

    async fn save_evaluation(
        &self,
        id: Uuid,
        evaluation: Evaluation,
    ) -> Result<InterviewSession, AppError> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            r#"
            UPDATE interview_sessions
            SET reviews = $2, total_score = $3, overall_review = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&evaluation.reviews))
        .bind(evaluation.total_score as i32)
        .bind(&evaluation.overall_review)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| not_found(id))?.try_into()
    }
}
