//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of text extracted from a PDF.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub text: String,
    /// File path the page came from.
    pub source: String,
    /// Zero-based page number.
    pub page: usize,
}

/// A bounded piece of a [`Document`], the unit that gets embedded and stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: usize,
    /// Position of the chunk within its page.
    pub ordinal: usize,
}

impl Chunk {
    /// Metadata stored next to the vector. `text` is what retrieval reads back.
    pub fn metadata(&self) -> Value {
        serde_json::json!({
            "text": self.text,
            "source": self.source,
            "page": self.page,
        })
    }
}

/// A vector ready to be written into the index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// Query parameters for RAG retrieval.
#[derive(Clone, Copy, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: u64,
}

/// A single retrieval hit with score, text and source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RagHit {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub source: Option<String>,
    pub page: Option<u64>,
    #[serde(skip)]
    pub payload: Value,
}

impl RagHit {
    /// Builds a hit from an index match, pulling `text`/`source`/`page` out of metadata.
    pub fn from_metadata(id: String, score: f32, payload: Value) -> Self {
        let text = payload
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let source = payload
            .get("source")
            .and_then(Value::as_str)
            .map(str::to_string);
        let page = payload.get("page").and_then(Value::as_u64);
        Self {
            id,
            score,
            text,
            source,
            page,
            payload,
        }
    }
}

/// Counters reported by one ingestion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// PDF files matched by the loader.
    pub files: usize,
    /// Files skipped because text extraction failed.
    pub skipped_files: usize,
    /// Pages extracted.
    pub documents: usize,
    /// Chunks produced by the splitter.
    pub chunks: usize,
    /// Vectors acknowledged by the index.
    pub upserted: u64,
}
