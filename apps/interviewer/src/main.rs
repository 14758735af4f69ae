mod config;
mod conversation;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod presence;
mod provisioning;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, Oracle};
use crate::presence::PresenceRegistry;
use crate::provisioning::collaborators::ResumeServiceClient;
use crate::provisioning::questions::OracleQuestionGenerator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{InMemorySessionStore, PgSessionStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interviewer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize session store (PostgreSQL when configured)
    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("PostgreSQL session store initialized");
            Arc::new(PgSessionStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set: sessions are kept in memory and lost on restart");
            Arc::new(InMemorySessionStore::new())
        }
    };

    // Initialize Oracle client
    let llm = LlmClient::new(
        config.oracle_url.clone(),
        config.oracle_model.clone(),
        config.collaborator_timeout,
    )?;
    info!("Oracle client initialized (model: {})", llm.model());
    let oracle: Arc<dyn Oracle> = Arc::new(llm);

    // Initialize résumé service client (parser + scorer)
    let resume_service = Arc::new(ResumeServiceClient::new(
        config.resume_service_url.clone(),
        config.collaborator_timeout,
    )?);
    info!("Résumé service client initialized ({})", config.resume_service_url);

    // Build app state
    let state = AppState {
        presence: Arc::new(PresenceRegistry::new()),
        generator: Arc::new(OracleQuestionGenerator::new(oracle.clone())),
        oracle,
        parser: resume_service.clone(),
        scorer: resume_service,
        store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
