//! HTTP surface for MediQuery.
//!
//! Routes:
//! - `POST /ask` question answering over the indexed encyclopedia
//! - `POST /analyze_image` multipart image analysis
//! - `POST /ingest` one-shot PDF ingestion
//! - `GET /health`

use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use med_qa::MedQa;
use tokio::signal;
use tracing::{error, info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        analyze_image::analyze_image_route::analyze_image, ask::ask_route::ask,
        health_route::health, ingest::ingest_route::ingest,
    },
};

const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";
const IMAGE_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Builds the router over shared state. Exposed so tests can serve it on an
/// ephemeral port.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route(
            "/analyze_image",
            post(analyze_image).layer(DefaultBodyLimit::max(IMAGE_BODY_LIMIT)),
        )
        .route("/ingest", post(ingest))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves the API until Ctrl+C.
///
/// Reads `API_ADDRESS` (default `127.0.0.1:8080`). Unless `INGEST_ON_START`
/// is `false`, ingestion is kicked off in the background so the server
/// accepts requests right away.
pub async fn start(qa: Arc<MedQa>) -> Result<(), AppError> {
    let address = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());
    let addr: std::net::SocketAddr = address
        .parse()
        .map_err(|_| AppError::InvalidAddress(address.clone()))?;

    let state = Arc::new(AppState::new(qa));

    if ingest_on_start() {
        let bg = state.clone();
        tokio::spawn(async move {
            match bg.ensure_ingested().await {
                Ok((stats, _)) => info!(
                    files = stats.files,
                    chunks = stats.chunks,
                    upserted = stats.upserted,
                    "startup ingestion finished"
                ),
                Err(e) => error!(error = %e, "startup ingestion failed; POST /ingest to retry"),
            }
        });
    } else {
        warn!("INGEST_ON_START=false, index is used as-is until POST /ingest");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::Bind)?;
    info!(%addr, "api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

fn ingest_on_start() -> bool {
    env::var("INGEST_ON_START")
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
        .unwrap_or(true)
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
