//! Local sentence embeddings through `fastembed` (ONNX runtime).
//!
//! The model is loaded once and shared; every call hops onto the blocking
//! pool so inference never stalls the async runtime.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, info, warn};

use super::{EmbedFuture, EmbeddingsProvider};
use crate::errors::RagError;

/// fastembed-backed provider for all-MiniLM-L6-v2 style models.
#[derive(Clone)]
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    dim: usize,
}

impl FastEmbedder {
    /// Loads (and on first use downloads) the named model.
    ///
    /// Blocking; call from `spawn_blocking` inside async code.
    ///
    /// # Errors
    /// `RagError::Embedding` when the model cannot be initialized.
    pub fn new(model_name: &str, show_progress: bool) -> Result<Self, RagError> {
        let (model_enum, dim) = resolve_model(model_name);
        info!(model = %model_name, dim, "loading embedding model");

        let model = TextEmbedding::try_new(
            InitOptions::new(model_enum).with_show_download_progress(show_progress),
        )
        .map_err(|e| RagError::Embedding(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            dim,
        })
    }
}

fn resolve_model(name: &str) -> (EmbeddingModel, usize) {
    match name {
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            (EmbeddingModel::AllMiniLML6V2, 384)
        }
        "bge-small-en-v1.5" => (EmbeddingModel::BGESmallENV15, 384),
        "bge-base-en-v1.5" => (EmbeddingModel::BGEBaseENV15, 768),
        other => {
            warn!(model = %other, "unknown embedding model, falling back to all-MiniLM-L6-v2");
            (EmbeddingModel::AllMiniLML6V2, 384)
        }
    }
}

impl EmbeddingsProvider for FastEmbedder {
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let model = Arc::clone(&self.model);
            let owned = texts.to_vec();
            let count = owned.len();

            let vectors = tokio::task::spawn_blocking(move || {
                let model = model
                    .lock()
                    .map_err(|_| RagError::Embedding("embedding model lock poisoned".into()))?;
                model
                    .embed(owned, None)
                    .map_err(|e| RagError::Embedding(e.to_string()))
            })
            .await??;

            if vectors.len() != count {
                return Err(RagError::Embedding(format!(
                    "expected {count} vectors, got {}",
                    vectors.len()
                )));
            }
            if let Some(v) = vectors.iter().find(|v| v.len() != self.dim) {
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }
            debug!(count, "embedded batch");
            Ok(vectors)
        })
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
