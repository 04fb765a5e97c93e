/// Represents the provider (backend) used for chat-completion inference.
///
/// Both providers speak the OpenAI chat-completion dialect, so they share a
/// single client; the variant only drives defaults (endpoint, key variable)
/// and shows up in logs.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let provider = LlmProvider::Groq;
/// assert_eq!(provider.default_endpoint(), "https://api.groq.com/openai/v1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Groq's hosted OpenAI-compatible API.
    Groq,
    /// OpenAI's API (or any other OpenAI-compatible server).
    OpenAI,
}

impl LlmProvider {
    /// Parses `LLM_KIND`-style values (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openai" | "chatgpt" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Base URL used when `LLM_ENDPOINT` is not set.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAI => "https://api.openai.com/v1",
        }
    }

    /// Environment variable holding the bearer token.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}
