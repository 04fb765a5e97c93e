//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// PDF text extraction failed for a file.
    #[error("pdf error in {path}: {message}")]
    Pdf { path: String, message: String },

    /// Embedding backend failed to initialize or to embed inputs.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Mismatch between produced vectors and the configured index dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Pinecone answered with a non-success status.
    #[error("pinecone error: HTTP {status} from {url}: {message}")]
    Pinecone {
        status: u16,
        url: String,
        message: String,
    },

    /// A freshly created index did not become ready in time.
    #[error("index '{0}' not ready after waiting")]
    IndexNotReady(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// HTTP transport errors (connect, TLS, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A blocking task (PDF extraction, embedding) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
