//! Prompt builder: fixed system messages + context block.

use rag_store::RagHit;

/// System message for grounded answers.
pub const SYSTEM_PROMPT: &str = "You are a medical assistant. Answer using the given context only.";

/// System message for image analysis.
pub const IMAGE_SYSTEM_PROMPT: &str = "Analyze the image medically.";

/// Joins chunk texts in ranking order, separated by blank lines.
pub fn build_context(hits: &[RagHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the user message: context first, then the question.
///
/// # Example
/// ```
/// use med_qa::prompt::build_user_prompt;
/// let p = build_user_prompt("What is anemia?", "Anemia is a low red cell count.");
/// assert_eq!(p, "Context:\nAnemia is a low red cell count.\n\nQuestion: What is anemia?");
/// ```
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!("Context:\n{context}\n\nQuestion: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_keeps_ranking_order() {
        let hits: Vec<RagHit> = ["first", "second", "third"]
            .iter()
            .enumerate()
            .map(|(i, t)| RagHit::from_metadata(i.to_string(), 1.0, json!({"text": t})))
            .collect();
        assert_eq!(build_context(&hits), "first\n\nsecond\n\nthird");
    }

    #[test]
    fn empty_context_still_has_sections() {
        assert_eq!(build_user_prompt("q", ""), "Context:\n\n\nQuestion: q");
    }
}
