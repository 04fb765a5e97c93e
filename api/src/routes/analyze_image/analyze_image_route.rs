//! POST /analyze_image: medical description of an uploaded image.

use std::sync::Arc;

use axum::extract::{Multipart, State, multipart::MultipartRejection};
use serde::Serialize;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult, IMAGE_FORMATS_HINT},
};

const FIELD: &str = "image";
const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Serialize)]
pub struct AnalyzeImageResponse {
    pub analysis: String,
}

/// Handler: POST /analyze_image (multipart, field `image`)
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/analyze_image -F image=@rash.png
/// ```
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse<AnalyzeImageResponse>> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FIELD) {
            continue;
        }
        if !is_supported(field.file_name(), field.content_type()) {
            return Err(AppError::bad_request(FIELD, "unsupported image format")
                .with_hint(IMAGE_FORMATS_HINT));
        }
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::bad_request(FIELD, "image is empty"));
        }
        debug!(bytes = bytes.len(), "POST /analyze_image");

        let analysis = state.qa.analyze_image(bytes.to_vec()).await?;
        return Ok(ApiResponse::success(AnalyzeImageResponse { analysis }));
    }

    Err(AppError::bad_request(FIELD, "multipart field `image` is missing"))
}

/// Accepts by file extension or by declared content type.
fn is_supported(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_ext = file_name
        .and_then(|n| n.rsplit_once('.'))
        .is_some_and(|(_, ext)| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    let by_type = content_type
        .is_some_and(|ct| CONTENT_TYPES.contains(&ct.to_ascii_lowercase().as_str()));
    by_ext || by_type
}
