//! Retrieval helpers: embed the query, search the index, order hits.

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{RagHit, RagQuery};

use tracing::trace;

/// Embeds the query text and returns hits ordered by score, highest first.
///
/// Ties keep the order the index returned them in.
///
/// # Errors
/// Returns embedding errors or index failures.
pub async fn rag_context(
    index: &dyn VectorIndex,
    query: RagQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RagHit>, RagError> {
    trace!(top_k = query.top_k, "retrieve::rag_context");
    if query.top_k == 0 {
        return Ok(Vec::new());
    }

    let qv = provider.embed(query.text).await?;
    if qv.len() != provider.dimension() {
        return Err(RagError::VectorSizeMismatch {
            got: qv.len(),
            want: provider.dimension(),
        });
    }

    let mut hits = index.query(qv, query.top_k).await?;
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.truncate(query.top_k as usize);

    trace!(hits = hits.len(), "retrieve::rag_context done");
    Ok(hits)
}
