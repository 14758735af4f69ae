//! Presence socket lifecycle: register on connect, forward pushes, unregister on close.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::errors::AppError;
use crate::models::user::Identity;
use crate::presence::protocol::ServerEvent;
use crate::presence::registry::ChannelHandle;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PresenceQuery {
    pub user_id: String,
}

/// GET /ws?user_id=...
///
/// Upgrades to a WebSocket that receives provisioning progress for `user_id`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<PresenceQuery>,
) -> Result<Response, AppError> {
    let identity = Identity::parse(&query.user_id)
        .ok_or_else(|| AppError::Validation("user_id cannot be empty".to_string()))?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

#[instrument(name = "presence_socket", skip_all, fields(identity = %identity))]
async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let (handle, events) = ChannelHandle::open(identity);
    if state.presence.register(handle.clone()).is_some() {
        info!("Superseded an older channel for this identity");
    }
    info!(channel_id = %handle.id(), "Presence channel registered");

    let (socket_tx, mut socket_rx) = socket.split();
    // Queued before the forwarder starts, so it is always the first frame.
    let _ = handle.send(ServerEvent::Connected {
        channel_id: handle.id(),
    });
    let forwarder = tokio::spawn(forward_events(socket_tx, events));

    while let Some(msg) = socket_rx.next().await {
        match msg {
            Ok(Message::Close(_)) => {
                debug!("Client sent close frame");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Error receiving from presence socket: {e}");
                break;
            }
        }
    }

    let removed = state.presence.unregister(&handle);
    forwarder.abort();
    info!(
        channel_id = %handle.id(),
        removed,
        "Presence channel closed"
    );
}

/// Drains the channel queue into the socket until either side goes away.
async fn forward_events(
    mut socket_tx: SplitSink<WebSocket, Message>,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = events.recv().await {
        let serialized = match serde_json::to_string(&event) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize {} event: {e}", event.name());
                continue;
            }
        };
        if socket_tx.send(Message::Text(serialized)).await.is_err() {
            debug!("Presence socket closed while forwarding");
            break;
        }
    }
}
