use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{Evaluation, InterviewSession, NewSession};
use crate::store::{not_found, SessionStore};

/// Process-local store. Sessions are lost on restart, and a second instance
/// sees none of them, so it only suits single-node development and tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, InterviewSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, new: NewSession) -> Result<InterviewSession, AppError> {
        let session = InterviewSession::new(new);
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        Ok(session)
    }

    async fn get(&self, id: Uuid) -> Result<Option<InterviewSession>, AppError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn record_answer(&self, id: Uuid, index: usize, answer: String) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        stored.record_answer(index, answer)
    }

    async fn save_evaluation(
        &self,
        id: Uuid,
        evaluation: Evaluation,
    ) -> Result<InterviewSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        stored.apply_evaluation(evaluation);
        Ok(stored.clone())
    }
}
