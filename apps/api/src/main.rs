mod coach;
mod config;
mod errors;
mod llm_client;
mod lookup;
mod recommendation;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{ChatClient, OpenRouterClient};
use crate::lookup::LookupTables;
use crate::recommendation::handlers::load_model;
use crate::recommendation::ranker::RecommendationRanker;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Static lookup tables are compiled in
    let lookups = Arc::new(LookupTables::bundled()?);
    info!(
        resources = lookups.resources.careers_with_resources().len(),
        book_categories = lookups.books.categories().len(),
        roadmaps = lookups.roadmaps.careers().len(),
        "Lookup tables loaded"
    );

    // Initialize chat client (optional)
    let chat: Option<Arc<dyn ChatClient>> = match &config.openrouter_api_key {
        Some(key) => {
            let client = OpenRouterClient::new(
                key.clone(),
                config.openrouter_model.clone(),
                Duration::from_secs(config.chat_timeout_secs),
            )?;
            info!("Chat client initialized (model: {})", config.openrouter_model);
            Some(Arc::new(client))
        }
        None => {
            warn!("OPENROUTER_API_KEY not set; coach endpoints disabled");
            None
        }
    };

    // Build app state
    let state = AppState {
        ranker: Arc::new(RecommendationRanker::unloaded()),
        lookups,
        chat,
        config: config.clone(),
    };

    if config.eager_model_load {
        // A failed load leaves the ranker empty; POST /api/v1/model/load can retry.
        if let Err(e) = load_model(&state).await {
            error!(
                "Model load from {} failed: {e:?}",
                config.model_dir.display()
            );
        }
    } else {
        info!("EAGER_MODEL_LOAD=false; waiting for POST /api/v1/model/load");
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
