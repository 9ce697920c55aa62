//! MedCheck API server
//!
//! Run with: cargo run -p medcheck-web --bin medcheck

use std::sync::Arc;

use medcheck_config::Config;
use medcheck_db::Database;
use medcheck_llm::build_backend;
use medcheck_web::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medcheck=debug,info")),
        )
        .init();

    info!("Starting MedCheck server...");

    let config = Config::load()?;
    let db = Arc::new(Database::open(&config.database.path)?);
    let backend = build_backend(&config.backend_config());

    let state = AppState::new(db, backend, config.evaluator_config(), config.graph.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
