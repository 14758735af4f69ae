//! Axum route handlers for the Conversation API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::conversation::engine::{take_turn, TurnReply, TurnRequest};
use crate::errors::AppError;
use crate::models::session::InterviewSession;
use crate::state::AppState;
use crate::store::require_session;

/// POST /api/v1/interviews/turn
pub async fn handle_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnReply>, AppError> {
    let reply = take_turn(state.oracle.as_ref(), state.store.as_ref(), request).await?;
    Ok(Json(reply))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = require_session(state.store.as_ref(), id).await?;
    Ok(Json(session))
}
