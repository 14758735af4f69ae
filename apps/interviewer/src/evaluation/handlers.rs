//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::evaluate_session;
use crate::models::session::InterviewSession;
use crate::state::AppState;

/// POST /api/v1/interviews/:id/evaluate
///
/// Reviews every answer and returns the updated session.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = evaluate_session(state.oracle.as_ref(), state.store.as_ref(), id).await?;
    Ok(Json(session))
}
