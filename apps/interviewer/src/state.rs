use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Oracle;
use crate::presence::PresenceRegistry;
use crate::provisioning::collaborators::{DocumentParser, ResumeScorer};
use crate::provisioning::questions::QuestionGenerator;
use crate::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Identity → live socket directory. The only state shared across requests.
    pub presence: Arc<PresenceRegistry>,
    pub oracle: Arc<dyn Oracle>,
    /// Pluggable résumé parser. Default: ResumeServiceClient.
    pub parser: Arc<dyn DocumentParser>,
    /// Pluggable résumé scorer. Default: ResumeServiceClient.
    pub scorer: Arc<dyn ResumeScorer>,
    /// Pluggable question generator. Default: OracleQuestionGenerator.
    pub generator: Arc<dyn QuestionGenerator>,
    /// PgSessionStore when DATABASE_URL is set, InMemorySessionStore otherwise.
    pub store: Arc<dyn SessionStore>,
}
