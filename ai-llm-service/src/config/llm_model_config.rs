use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use (Groq, OpenAI).
/// - `model`: The model identifier (e.g., `"meta-llama/llama-4-maverick-17b-128e-instruct"`).
/// - `endpoint`: Versioned API base, e.g. `https://api.groq.com/openai/v1`.
/// - `api_key`: Bearer token. `None` sends no `Authorization` header and lets the
///   provider reject the call.
/// - `max_tokens`: Maximum number of tokens to generate.
/// - `temperature`: Sampling temperature. `None` omits the field from the request.
/// - `top_p`: Nucleus sampling cutoff.
/// - `timeout_secs`: Optional request timeout in seconds (`None` = client default).
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Groq,
///     model: "meta-llama/llama-4-maverick-17b-128e-instruct".to_string(),
///     endpoint: "https://api.groq.com/openai/v1".to_string(),
///     api_key: Some("gsk_...".to_string()),
///     max_tokens: Some(512),
///     temperature: Some(0.2),
///     top_p: None,
///     timeout_secs: None,
/// };
/// assert_eq!(cfg.max_tokens, Some(512));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The LLM provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Versioned API base URL.
    pub endpoint: String,

    /// Optional bearer token.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (controls creativity).
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
