//! Events pushed from the server to a client over its presence socket.

use serde::Serialize;
use uuid::Uuid;

/// Server → client events. Serialized as `{"event": "<name>", "payload": {...}}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Sent once when the socket is registered.
    #[serde(rename_all = "camelCase")]
    Connected { channel_id: Uuid },
    /// Role/topic validation finished. Pushed even when `valid` is false.
    Validated { valid: bool },
    /// The résumé was parsed into structured content.
    Parsed,
    /// The résumé was scored against the role and topics.
    Scored { score: u32, summary: String },
    /// The score gate was applied.
    Gated { passed: bool, threshold: u32 },
    /// Questions were generated and the session is ready.
    #[serde(rename_all = "camelCase")]
    QuestionsGenerated { session_id: Uuid, count: usize },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::Validated { .. } => "validated",
            ServerEvent::Parsed => "parsed",
            ServerEvent::Scored { .. } => "scored",
            ServerEvent::Gated { .. } => "gated",
            ServerEvent::QuestionsGenerated { .. } => "questionsGenerated",
        }
    }
}
