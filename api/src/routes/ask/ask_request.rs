use serde::Deserialize;

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// Optional reference answer; when present the response carries ROUGE scores.
    #[serde(default)]
    pub reference: Option<String>,
    /// Optional override: number of chunks retrieved as context.
    #[serde(default)]
    pub k: Option<u64>,
}
