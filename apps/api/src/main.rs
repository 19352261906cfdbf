mod analysis;
mod config;
mod errors;
mod parser;
mod routes;
mod state;
mod taxonomy;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::sentences::RuleSegmenter;
use crate::analysis::similarity::{Embedder, HashEmbedder, HttpEmbedder};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::Taxonomy;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Resume Analyzer API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Taxonomy context object: constructed once, injected everywhere.
    let taxonomy = Arc::new(Taxonomy::new(config.taxonomy_dir.clone()));

    // Warm the cache eagerly so a broken config shows up in the logs at
    // startup; scoring still degrades gracefully if it stays broken.
    match (taxonomy.skills(), taxonomy.verbs()) {
        (Ok(skills), Ok(verbs)) => info!(
            "taxonomy loaded: {} skill aliases, {} action verbs",
            skills.len(),
            verbs.impact.len() + verbs.build.len() + verbs.support.len()
        ),
        (skills, verbs) => {
            for error in [skills.err(), verbs.err()].into_iter().flatten() {
                warn!("taxonomy unavailable at startup: {error}");
            }
        }
    }

    // Embedding backend: external service when configured, deterministic
    // hash embedder otherwise.
    let embedder: Arc<dyn Embedder> = match &config.embedding_endpoint {
        Some(endpoint) => Arc::new(HttpEmbedder::new(endpoint.clone())),
        None => Arc::new(HashEmbedder::new()),
    };
    info!("embedding backend: {}", embedder.name());

    let state = AppState {
        taxonomy,
        embedder,
        segmenter: Arc::new(RuleSegmenter),
        config: config.clone(),
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
