use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use rag_store::{
    Chunk, EmbedFuture, EmbeddingsProvider, IndexEntry, IndexFuture, IngestStats, RagConfig,
    RagError, RagHit, RagQuery, RagStore, VectorIndex, chunk_id,
};
use serde_json::json;

struct LenEmbedder {
    dim: usize,
}

impl EmbeddingsProvider for LenEmbedder {
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        let out = texts
            .iter()
            .map(|t| vec![t.len() as f32; self.dim])
            .collect();
        Box::pin(async move { Ok(out) })
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[derive(Default)]
struct MemoryIndex {
    ensure_calls: AtomicUsize,
    upserts: Mutex<Vec<Vec<IndexEntry>>>,
    canned: Vec<RagHit>,
    queried_top_k: Mutex<Option<u64>>,
}

impl VectorIndex for MemoryIndex {
    fn name(&self) -> &str {
        "memory"
    }

    fn ensure_index<'a>(&'a self, _dimension: usize) -> IndexFuture<'a, ()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }

    fn upsert<'a>(&'a self, entries: Vec<IndexEntry>) -> IndexFuture<'a, u64> {
        let n = entries.len() as u64;
        self.upserts.lock().unwrap().push(entries);
        Box::pin(async move { Ok(n) })
    }

    fn query<'a>(&'a self, _vector: Vec<f32>, top_k: u64) -> IndexFuture<'a, Vec<RagHit>> {
        *self.queried_top_k.lock().unwrap() = Some(top_k);
        let hits = self.canned.clone();
        Box::pin(async move { Ok(hits) })
    }
}

fn small_cfg() -> RagConfig {
    let mut cfg = RagConfig::new_default("medical-chatbot");
    cfg.dimension = 4;
    cfg
}

fn store(index: Arc<MemoryIndex>) -> RagStore {
    RagStore::new(small_cfg(), Arc::new(LenEmbedder { dim: 4 }), index).unwrap()
}

fn hit(id: &str, score: f32) -> RagHit {
    RagHit::from_metadata(id.into(), score, json!({"text": id, "source": "enc.pdf", "page": 0}))
}

#[tokio::test]
async fn empty_directory_makes_no_index_calls() {
    let dir = tempfile::tempdir().unwrap();
    let index = Arc::new(MemoryIndex::default());

    let stats = store(index.clone()).ingest_dir(dir.path()).await.unwrap();

    assert_eq!(stats, IngestStats::default());
    assert_eq!(index.ensure_calls.load(Ordering::SeqCst), 0);
    assert!(index.upserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_directory_is_not_an_error() {
    let index = Arc::new(MemoryIndex::default());
    let stats = store(index.clone())
        .ingest_dir("/no/such/encyclopedia_pdf")
        .await
        .unwrap();

    assert_eq!(stats.upserted, 0);
    assert!(index.upserts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chunks_are_upserted_in_batches_with_stable_ids() {
    let index = Arc::new(MemoryIndex::default());
    let chunks: Vec<Chunk> = (0..250)
        .map(|i| Chunk {
            text: format!("chunk {i}"),
            source: "enc.pdf".into(),
            page: i / 10,
            ordinal: i % 10,
        })
        .collect();

    let upserted = store(index.clone()).ingest_chunks(&chunks).await.unwrap();
    assert_eq!(upserted, 250);
    assert_eq!(index.ensure_calls.load(Ordering::SeqCst), 1);

    let batches = index.upserts.lock().unwrap();
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![100, 100, 50]);

    let first = &batches[0][0];
    assert_eq!(first.id, chunk_id("enc.pdf", 0, 0));
    assert_eq!(first.metadata["text"], "chunk 0");
    assert_eq!(first.values.len(), 4);
}

#[tokio::test]
async fn hits_are_sorted_by_score_and_ties_keep_index_order() {
    let index = Arc::new(MemoryIndex {
        canned: vec![hit("low", 0.2), hit("a", 0.9), hit("mid", 0.5), hit("b", 0.9)],
        ..Default::default()
    });

    let hits = store(index.clone())
        .rag_context(RagQuery {
            text: "What is anemia?",
            top_k: 5,
        })
        .await
        .unwrap();

    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "mid", "low"]);
    assert_eq!(*index.queried_top_k.lock().unwrap(), Some(5));
}

#[test]
fn embedder_dimension_must_match_config() {
    let err = RagStore::new(
        small_cfg(),
        Arc::new(LenEmbedder { dim: 3 }),
        Arc::new(MemoryIndex::default()),
    )
    .err()
    .unwrap();
    assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 4 }));
}
