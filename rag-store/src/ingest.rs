//! End-to-end ingestion pipeline: load PDFs → split → embed → ensure index → upsert.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::RagConfig;
use crate::embed::EmbeddingsProvider;
use crate::embed_pool::embed_all;
use crate::errors::RagError;
use crate::ids::chunk_id;
use crate::index::VectorIndex;
use crate::loader::load_pdf_dir;
use crate::record::{Chunk, IndexEntry, IngestStats};
use crate::splitter::RecursiveSplitter;

/// Ingests every matching PDF directly inside `dir`.
///
/// A missing or empty directory is a no-op: nothing is embedded and the
/// index is neither created nor written.
pub async fn ingest_dir(
    cfg: &RagConfig,
    dir: &Path,
    provider: &dyn EmbeddingsProvider,
    index: &dyn VectorIndex,
) -> Result<IngestStats, RagError> {
    info!(dir = %dir.display(), index = %index.name(), "ingestion started");

    let loaded = load_pdf_dir(dir, &cfg.pdf_glob).await?;
    let mut stats = IngestStats {
        files: loaded.files,
        skipped_files: loaded.skipped,
        documents: loaded.documents.len(),
        ..Default::default()
    };
    if loaded.documents.is_empty() {
        warn!(dir = %dir.display(), files = stats.files, "no PDF text to ingest");
        return Ok(stats);
    }

    let splitter = RecursiveSplitter::new(cfg.chunk_size, cfg.chunk_overlap);
    let chunks: Vec<Chunk> = loaded
        .documents
        .iter()
        .flat_map(|d| splitter.split_document(d))
        .collect();
    stats.chunks = chunks.len();
    debug!(documents = stats.documents, chunks = stats.chunks, "split documents");

    stats.upserted = ingest_chunks(cfg, &chunks, provider, index).await?;

    info!(
        files = stats.files,
        skipped_files = stats.skipped_files,
        documents = stats.documents,
        chunks = stats.chunks,
        upserted = stats.upserted,
        "ingestion complete"
    );
    Ok(stats)
}

/// Embeds `chunks` and upserts them in batches. Returns the number of acknowledged vectors.
pub async fn ingest_chunks(
    cfg: &RagConfig,
    chunks: &[Chunk],
    provider: &dyn EmbeddingsProvider,
    index: &dyn VectorIndex,
) -> Result<u64, RagError> {
    if chunks.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embed_all(&texts, provider, cfg.dimension, cfg.embedding_batch).await?;

    index.ensure_index(cfg.dimension).await?;

    let entries: Vec<IndexEntry> = chunks
        .iter()
        .zip(vectors)
        .map(|(c, values)| IndexEntry {
            id: chunk_id(&c.source, c.page, c.ordinal),
            values,
            metadata: c.metadata(),
        })
        .collect();

    let batch_size = cfg.upsert_batch.max(1);
    let pb = ProgressBar::new(entries.len().div_ceil(batch_size) as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }

    let mut total: u64 = 0;
    let mut entries = entries.into_iter().peekable();
    while entries.peek().is_some() {
        let batch: Vec<IndexEntry> = entries.by_ref().take(batch_size).collect();
        total += index.upsert(batch).await?;
        pb.inc(1);
    }
    pb.finish_with_message("upload complete");

    Ok(total)
}
