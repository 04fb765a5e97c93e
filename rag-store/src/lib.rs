//! High-level RAG facade: PDF ingestion + top-K retrieval.
//!
//! This crate provides a clean API to:
//! - Load a directory of PDFs, split pages into overlapping chunks, embed them
//!   locally and upsert them into Pinecone (or Qdrant)
//! - Retrieve the top-K chunks for a textual query
//!
//! Backends sit behind the [`VectorIndex`] and [`EmbeddingsProvider`] traits so
//! tests and hosts can swap them.

mod config;
mod embed;
mod embed_pool;
mod errors;
mod ids;
mod index;
mod ingest;
mod loader;
mod record;
mod retrieve;
mod splitter;

pub use config::{DistanceKind, PineconeConfig, QdrantConfig, RagConfig, VectorBackend};
pub use embed::{EmbedFuture, EmbeddingsProvider, local::FastEmbedder};
pub use errors::RagError;
pub use ids::chunk_id;
pub use index::{
    IndexFuture, VectorIndex, pinecone::PineconeIndex, qdrant::QdrantIndex,
};
pub use loader::{load_pdf_dir, split_pages};
pub use record::{Chunk, Document, IndexEntry, IngestStats, RagHit, RagQuery};
pub use splitter::RecursiveSplitter;

use std::{path::Path, sync::Arc};

use tracing::{debug, info, trace};

/// High-level facade that wires configuration, embedder and index.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    embedder: Arc<dyn EmbeddingsProvider>,
    index: Arc<dyn VectorIndex>,
}

impl RagStore {
    /// Loads the configured embedding model and builds the configured index client.
    ///
    /// # Errors
    /// `RagError::Embedding` if the model cannot be loaded, or client construction errors.
    pub async fn connect(cfg: RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;
        let model = cfg.embedding_model.clone();
        let embedder = tokio::task::spawn_blocking(move || FastEmbedder::new(&model, true)).await??;
        let index = index::connect(&cfg)?;
        info!(
            backend = ?cfg.backend,
            index = %cfg.index_name,
            model = %cfg.embedding_model,
            "rag store connected"
        );
        Self::new(cfg, Arc::new(embedder), index)
    }

    /// Builds a store from explicit parts.
    ///
    /// # Errors
    /// `RagError::VectorSizeMismatch` if the embedder's dimension differs from the config.
    pub fn new(
        cfg: RagConfig,
        embedder: Arc<dyn EmbeddingsProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self, RagError> {
        cfg.validate()?;
        if embedder.dimension() != cfg.dimension {
            return Err(RagError::VectorSizeMismatch {
                got: embedder.dimension(),
                want: cfg.dimension,
            });
        }
        Ok(Self {
            cfg,
            embedder,
            index,
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    pub fn index_name(&self) -> &str {
        self.index.name()
    }

    /// Creates the index if absent.
    pub async fn ensure_index(&self) -> Result<(), RagError> {
        trace!(index = %self.index.name(), "RagStore::ensure_index");
        self.index.ensure_index(self.cfg.dimension).await
    }

    /// Ingests every matching PDF directly inside `dir`.
    ///
    /// # Errors
    /// I/O, embedding, or index failures. Per-file extraction failures are
    /// counted in [`IngestStats::skipped_files`] instead.
    pub async fn ingest_dir(&self, dir: impl AsRef<Path>) -> Result<IngestStats, RagError> {
        debug!(dir = %dir.as_ref().display(), "RagStore::ingest_dir");
        ingest::ingest_dir(&self.cfg, dir.as_ref(), self.embedder.as_ref(), self.index.as_ref())
            .await
    }

    /// Embeds and upserts already-split chunks.
    pub async fn ingest_chunks(&self, chunks: &[Chunk]) -> Result<u64, RagError> {
        trace!(chunks = chunks.len(), "RagStore::ingest_chunks");
        ingest::ingest_chunks(&self.cfg, chunks, self.embedder.as_ref(), self.index.as_ref()).await
    }

    /// Retrieves the `query.top_k` most similar chunks, highest score first.
    ///
    /// # Errors
    /// Returns embedding errors or index failures.
    pub async fn rag_context(&self, query: RagQuery<'_>) -> Result<Vec<RagHit>, RagError> {
        trace!(top_k = query.top_k, "RagStore::rag_context");
        retrieve::rag_context(self.index.as_ref(), query, self.embedder.as_ref()).await
    }
}
