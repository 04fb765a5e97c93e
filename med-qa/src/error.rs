//! Typed error for the med-qa crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MedQaError {
    /// Errors from the underlying rag-store crate (PDFs, embeddings, vector index).
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// Chat-completion failures.
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Uploaded bytes could not be decoded or re-encoded as an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A blocking task (JPEG encoding) panicked or was cancelled.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Malformed configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Rejected caller input, e.g. an empty question.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
