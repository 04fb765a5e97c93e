//! Vector index backends behind one async trait.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::config::{RagConfig, VectorBackend};
use crate::errors::RagError;
use crate::record::{IndexEntry, RagHit};

pub mod pinecone;
pub mod qdrant;

/// Boxed future returned by [`VectorIndex`] methods.
pub type IndexFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// A named vector index that can be created, written and queried.
pub trait VectorIndex: Send + Sync {
    /// Index or collection name.
    fn name(&self) -> &str;

    /// Creates the index with `dimension` if it does not exist and waits until it is usable.
    fn ensure_index<'a>(&'a self, dimension: usize) -> IndexFuture<'a, ()>;

    /// Inserts or overwrites entries by id. Returns how many were acknowledged.
    fn upsert<'a>(&'a self, entries: Vec<IndexEntry>) -> IndexFuture<'a, u64>;

    /// Returns up to `top_k` nearest entries, metadata included.
    fn query<'a>(&'a self, vector: Vec<f32>, top_k: u64) -> IndexFuture<'a, Vec<RagHit>>;
}

/// Builds the backend selected by `cfg.backend`.
///
/// # Errors
/// `RagError::Config`/`RagError::Qdrant`/`RagError::Http` if the client cannot be built.
pub fn connect(cfg: &RagConfig) -> Result<Arc<dyn VectorIndex>, RagError> {
    Ok(match cfg.backend {
        VectorBackend::Pinecone => Arc::new(pinecone::PineconeIndex::new(cfg)?),
        VectorBackend::Qdrant => Arc::new(qdrant::QdrantIndex::new(cfg)?),
    })
}
