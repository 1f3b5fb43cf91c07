//! Web server for the explorer
//!
//! Provides an HTTP server using Axum to serve the explorer page and the
//! JSON API endpoints.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::LimitsConfig;
use crate::error::ExplorerError;

use super::routes;

/// Shared application state
///
/// Read-only after startup; every request builds its own RNG and buffers.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub limits: LimitsConfig,
    /// Seed used by requests that do not pass one
    pub default_seed: Option<u64>,
}

impl AppState {
    /// RNG for one request, seeded from the request, the configured default,
    /// or OS entropy, in that order
    pub fn rng(&self, seed: Option<u64>) -> StdRng {
        match seed.or(self.default_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn check_nodes(&self, name: &str, count: usize) -> Result<(), ExplorerError> {
        if count > self.limits.max_nodes {
            return Err(ExplorerError::invalid(
                name,
                format!("{} nodes exceeds the limit of {}", count, self.limits.max_nodes),
            ));
        }
        Ok(())
    }
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            open_browser: false,
        }
    }
}

/// Router with every API and static route plus body limit, tracing and CORS
/// layers
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(routes::static_routes())
        .layer(DefaultBodyLimit::max(state.limits.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Start the web server and serve the explorer
pub async fn start_server(
    state: AppState,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    let url = format!("http://{}", listener.local_addr()?);
    info!("Starting web server at {}", url);

    if config.open_browser {
        info!("Opening browser...");
        if let Err(e) = open::that(&url) {
            warn!("Could not open browser: {}", e);
            warn!("Please open {} manually", url);
        }
    }

    info!("Press Ctrl+C to stop the server");

    axum::serve(listener, app).await?;

    Ok(())
}
