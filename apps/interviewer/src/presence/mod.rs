//! Presence Registry
//!
//! Tracks which live WebSocket belongs to which participant so long-running
//! requests (résumé provisioning) can narrate progress to the exact client that
//! started them without holding a return path open.
//!
//! - `protocol`: server → client event format.
//! - `registry`: the sharded identity → channel directory.
//! - `socket`: the WebSocket connect/forward/disconnect lifecycle.

pub mod protocol;
pub mod registry;
pub mod socket;

pub use protocol::ServerEvent;
pub use registry::{PresenceRegistry, ProgressSink, PushError};
pub use socket::ws_handler;
