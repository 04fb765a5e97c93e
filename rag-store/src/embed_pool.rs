//! Batched embedding with dimension checks.

use crate::{embed::EmbeddingsProvider, errors::RagError};
use tracing::{debug, trace};

/// Embeds `texts` in batches of `batch_size`, preserving input order.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if any vector differs from
/// `expected_dim`, or the provider's error.
pub async fn embed_all(
    texts: &[String],
    provider: &dyn EmbeddingsProvider,
    expected_dim: usize,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    debug!(total = texts.len(), batch_size, "embed_pool::embed_all");

    let mut out = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size.max(1)) {
        let vectors = provider.embed_batch(batch).await?;
        if vectors.len() != batch.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            )));
        }
        for v in vectors {
            if v.len() != expected_dim {
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: expected_dim,
                });
            }
            out.push(v);
        }
        trace!(done = out.len(), "embed_pool::embed_all batch done");
    }
    Ok(out)
}
