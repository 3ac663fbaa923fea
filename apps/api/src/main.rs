mod config;
mod convert;
mod docx;
mod errors;
mod extract;
mod llm_client;
mod routes;
mod session;
mod state;
mod store;
mod tailoring;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::convert::LibreOfficeConverter;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::store::Records;
use crate::tailoring::LlmAdvisor;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Flat-file storage
    let paths = config.paths();
    paths.bootstrap()?;
    let records = Records::load(&paths)?;

    // Initialize LLM client
    let llm = LlmClient::new(config.llm.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    info!("PDF export via {}", config.soffice_bin);

    let state = AppState {
        paths,
        advisor: Arc::new(LlmAdvisor(llm)),
        converter: Arc::new(LibreOfficeConverter::new(config.soffice_bin.clone())),
        records: Arc::new(Mutex::new(records)),
        sessions: SessionStore::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
