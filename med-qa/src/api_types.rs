//! Public API types re-used by external crates (e.g., the HTTP API layer).

use answer_eval::ScoreReport;
use rag_store::RagHit;
use serde::Serialize;

/// A compact record of a context chunk that was fed to the LLM.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsedChunk {
    pub score: f32,
    pub source: Option<String>,
    pub page: Option<u64>,
    pub text: String,
}

impl From<RagHit> for UsedChunk {
    fn from(h: RagHit) -> Self {
        Self {
            score: h.score,
            source: h.source,
            page: h.page,
            text: h.text,
        }
    }
}

/// Answer, optional ROUGE scores against a reference, and the context used.
///
/// # Example
/// ```
/// use med_qa::ScoredAnswer;
/// let a = ScoredAnswer { answer: "Rest and fluids.".into(), scores: None, context: vec![] };
/// assert!(a.scores.is_none());
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct ScoredAnswer {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreReport>,
    pub context: Vec<UsedChunk>,
}
