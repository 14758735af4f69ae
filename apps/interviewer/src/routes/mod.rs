pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::conversation::handlers as conversation;
use crate::evaluation::handlers as evaluation;
use crate::presence::ws_handler;
use crate::provisioning::handlers as provisioning;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Presence
        .route("/ws", get(ws_handler))
        // Provisioning API
        .route(
            "/api/v1/interviews/provision/resume",
            post(provisioning::handle_provision_resume),
        )
        .route(
            "/api/v1/interviews/provision/topic",
            post(provisioning::handle_provision_topic),
        )
        // Conversation API
        .route("/api/v1/interviews/turn", post(conversation::handle_turn))
        .route("/api/v1/interviews/:id", get(conversation::handle_get_session))
        // Evaluation API
        .route(
            "/api/v1/interviews/:id/evaluate",
            post(evaluation::handle_evaluate),
        )
        .with_state(state)
}
