// Provisioning Pipeline
// Turns (identity, role, topics, count, résumé) into a persisted interview session,
// narrating each checkpoint to the participant's presence channel.
// All Oracle calls go through llm_client; collaborators are traits held in AppState.

pub mod collaborators;
pub mod document;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod questions;
pub mod topic;
pub mod validation;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Identity;

/// Résumés scoring strictly below this are turned away before questions are generated.
pub const MIN_RESUME_SCORE: u32 = 30;

pub const MAX_QUESTIONS: u32 = 25;

/// Validated provisioning input shared by the résumé and topic paths.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSpec {
    pub identity: Identity,
    pub role: String,
    pub topics: Vec<String>,
    pub desired_count: u32,
}

impl InterviewSpec {
    /// Rejects bad input before any collaborator is called. Blank topics are dropped.
    pub fn parse(
        user_id: &str,
        role: &str,
        topics: Vec<String>,
        desired_count: u32,
    ) -> Result<Self, AppError> {
        let identity = Identity::parse(user_id)
            .ok_or_else(|| AppError::Validation("user_id cannot be empty".to_string()))?;

        let role = role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("role cannot be empty".to_string()));
        }

        let topics: Vec<String> = topics
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if topics.is_empty() {
            return Err(AppError::Validation(
                "at least one non-empty topic is required".to_string(),
            ));
        }

        if !(1..=MAX_QUESTIONS).contains(&desired_count) {
            return Err(AppError::Validation(format!(
                "desired_count must be between 1 and {MAX_QUESTIONS}, got {desired_count}"
            )));
        }

        Ok(Self {
            identity,
            role: role.to_string(),
            topics,
            desired_count,
        })
    }
}

/// An expected business outcome, not a failure. Rendered as 422 with a
/// `rejection` body so clients can tell it apart from retryable errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    InvalidRoleOrTopic {
        role: String,
        topic: String,
    },
    ScoreBelowThreshold {
        score: u32,
        threshold: u32,
        summary: String,
    },
}

impl Rejection {
    pub fn message(&self) -> String {
        match self {
            Rejection::InvalidRoleOrTopic { role, topic } => {
                format!("The topic '{topic}' is not a sensible fit for the role '{role}'.")
            }
            Rejection::ScoreBelowThreshold {
                score, threshold, ..
            } => format!(
                "Your résumé scored {score}/100, below the {threshold}/100 needed to start this interview."
            ),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let mut body = serde_json::to_value(&self).unwrap_or_else(|_| json!({}));
        if let Some(obj) = body.as_object_mut() {
            obj.insert("message".to_string(), json!(self.message()));
        }
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "rejection": body })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    Ready { session_id: Uuid, question_count: usize },
    Rejected(Rejection),
}

impl IntoResponse for ProvisionOutcome {
    fn into_response(self) -> Response {
        match self {
            ProvisionOutcome::Ready {
                session_id,
                question_count,
            } => (
                StatusCode::CREATED,
                Json(json!({
                    "status": "ready",
                    "sessionId": session_id,
                    "questionCount": question_count,
                })),
            )
                .into_response(),
            ProvisionOutcome::Rejected(rejection) => rejection.into_response(),
        }
    }
}

/// Splits `"a, b"` style values and flattens repeated fields into one topic list.
pub fn split_topics<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|v| {
            v.as_ref()
                .split(',')
                .map(|t| t.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}
