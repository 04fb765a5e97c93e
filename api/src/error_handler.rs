use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use med_qa::MedQaError;
use rag_store::RagError;
use thiserror::Error;
use tracing::error;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot ---
    #[error("invalid API_ADDRESS `{0}`")]
    InvalidAddress(String),

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{message}")]
    BadRequest {
        message: String,
        field: Option<&'static str>,
        hint: Option<&'static str>,
    },

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
        field: Option<&'static str>,
        hint: Option<&'static str>,
    },
}

/// Accepted upload formats, reported as a hint on image errors.
pub const IMAGE_FORMATS_HINT: &str = "send a .jpg, .jpeg or .png file in the `image` field";

impl AppError {
    pub fn bad_request(field: &'static str, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            field: Some(field),
            hint: None,
        }
    }

    /// Attaches a hint to request-level errors; boot errors are unchanged.
    pub fn with_hint(mut self, text: &'static str) -> Self {
        match &mut self {
            AppError::BadRequest { hint, .. } | AppError::Http { hint, .. } => *hint = Some(text),
            _ => {}
        }
        self
    }

    fn detail(&self) -> Option<ApiErrorDetail> {
        let (field, hint) = match self {
            AppError::BadRequest { field, hint, .. } | AppError::Http { field, hint, .. } => {
                (*field, *hint)
            }
            _ => return None,
        };
        if field.is_none() && hint.is_none() {
            return None;
        }
        Some(ApiErrorDetail {
            path: field.map(str::to_string),
            hint: hint.map(str::to_string),
        })
    }

    fn upstream(message: String) -> Self {
        AppError::Http {
            status: StatusCode::BAD_GATEWAY,
            code: "UPSTREAM_ERROR",
            message,
            field: None,
            hint: None,
        }
    }

    fn internal(message: String) -> Self {
        AppError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message,
            field: None,
            hint: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::InvalidAddress(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidAddress(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, code = self.error_code(), error = %self, "request failed");
        }
        let details = self.detail().into_iter().collect();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), details)
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest {
            message: err.body_text(),
            field: None,
            hint: None,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::bad_request("image", err.body_text())
    }
}

impl From<axum::extract::multipart::MultipartRejection> for AppError {
    fn from(err: axum::extract::multipart::MultipartRejection) -> Self {
        AppError::bad_request("image", err.body_text())
    }
}

/// Remote answered badly or could not be reached → 502; local faults → 500.
impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        match err {
            AiLlmError::Config(_) => AppError::internal(err.to_string()),
            AiLlmError::Provider(_) | AiLlmError::HttpTransport(_) => {
                AppError::upstream(err.to_string())
            }
            _ => AppError::internal(err.to_string()),
        }
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Pinecone { .. }
            | RagError::Qdrant(_)
            | RagError::Http(_)
            | RagError::IndexNotReady(_) => AppError::upstream(err.to_string()),
            _ => AppError::internal(err.to_string()),
        }
    }
}

impl From<MedQaError> for AppError {
    fn from(err: MedQaError) -> Self {
        match err {
            MedQaError::Rag(e) => e.into(),
            MedQaError::Llm(e) => e.into(),
            MedQaError::Image(e) => AppError::Http {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "INVALID_IMAGE",
                message: format!("could not decode image: {e}"),
                field: Some("image"),
                hint: Some(IMAGE_FORMATS_HINT),
            },
            MedQaError::InvalidInput(msg) => AppError::bad_request("question", msg),
            MedQaError::Join(_) | MedQaError::Config(_) => AppError::internal(err.to_string()),
        }
    }
}
