//! Session Store: persistence for interview sessions.
//!
//! `AppState` holds an `Arc<dyn SessionStore>`: `PgSessionStore` when a database is
//! configured, `InMemorySessionStore` otherwise (and in tests).

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{Evaluation, InterviewSession, NewSession};

pub mod memory;
pub mod postgres;

pub use memory::InMemorySessionStore;
pub use postgres::PgSessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a fresh session with placeholder answers and returns it.
    async fn create(&self, new: NewSession) -> Result<InterviewSession, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError>;

    /// Writes one answer slot and nothing else. Other slots keep whatever the
    /// store holds at write time; repeated writes to the same slot resolve as
    /// last-write-wins.
    async fn record_answer(&self, id: Uuid, index: usize, answer: String) -> Result<(), AppError>;

    /// Replaces the evaluation fields and returns the stored session. Answers are
    /// left as they are in the store.
    async fn save_evaluation(
        &self,
        id: Uuid,
        evaluation: Evaluation,
    ) -> Result<InterviewSession, AppError>;
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Interview session {id} not found"))
}

/// Loads a session or fails with `NotFound`.
pub async fn require_session(
    store: &dyn SessionStore,
    id: Uuid,
) -> Result<InterviewSession, AppError> {
    store
        .get(id)
        .await?
        .ok_or_else(|| not_found(id))
}
