use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Boxed future returned by [`EmbeddingsProvider`] methods.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// Provider interface for embedding generation.
///
/// Async because the local model runs on the blocking pool and remote
/// providers perform HTTP requests.
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds a batch of texts, one vector per input in the same order.
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>>;

    /// Embeds a single text.
    fn embed<'a>(&'a self, text: &'a str) -> EmbedFuture<'a, Vec<f32>> {
        Box::pin(async move {
            let batch = [text.to_string()];
            self.embed_batch(&batch)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| RagError::Embedding("provider returned no vector".into()))
        })
    }

    /// Size of the vectors this provider produces.
    fn dimension(&self) -> usize;
}

pub mod local;
