//! POST /ingest: loads the PDF directory into the index, once per process.

use std::sync::Arc;

use axum::extract::State;
use rag_store::IngestStats;
use serde::Serialize;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    #[serde(flatten)]
    pub stats: IngestStats,
    /// `true` when the data was loaded by an earlier call or at startup.
    pub already_loaded: bool,
}

/// Handler: POST /ingest
pub async fn ingest(State(state): State<Arc<AppState>>) -> AppResult<ApiResponse<IngestResponse>> {
    let (stats, already_loaded) = state.ensure_ingested().await?;
    Ok(ApiResponse::success(IngestResponse {
        stats,
        already_loaded,
    }))
}
