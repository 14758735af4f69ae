// Conversation Engine
// Drives a provisioned interview one turn at a time. The client echoes the asked
// questions; the session store holds the answers.

pub mod engine;
pub mod handlers;
pub mod prompts;
