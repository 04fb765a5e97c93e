//! Default LLM configs loaded from environment variables.
//!
//! Two roles are provided, both served by the same OpenAI-compatible endpoint:
//!
//! - **Text**   → grounded answers over retrieved context (sampling temperature set)
//! - **Vision** → image analysis (no temperature field is sent)
//!
//! # Environment variables
//!
//! - `LLM_KIND`          = provider kind (`groq` default, `openai`)
//! - `LLM_ENDPOINT`      = versioned API base (provider default if unset)
//! - `GROQ_API_KEY` / `OPENAI_API_KEY` = bearer token (not validated here)
//! - `LLM_MODEL`         = text model
//! - `LLM_VISION_MODEL`  = image model (falls back to `LLM_MODEL`)
//! - `LLM_MAX_TOKENS`    = max output tokens (u32, default 512)
//! - `LLM_TEMPERATURE`   = text sampling temperature (f32, default 0.2)
//! - `LLM_TIMEOUT_SECS`  = request timeout (u64, unset = no explicit timeout)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_f32, env_opt_string, env_opt_u32, env_opt_u64,
        validate_http_endpoint, validate_range_f32,
    },
};

/// Model used for both roles unless overridden.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";

/// Output budget for both roles.
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Low temperature keeps answers close to the retrieved context.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

fn provider_from_env() -> Result<LlmProvider, AiLlmError> {
    match env_opt_string("LLM_KIND") {
        Some(kind) => LlmProvider::parse(&kind)
            .ok_or_else(|| ConfigError::UnsupportedProvider(kind).into()),
        None => Ok(LlmProvider::Groq),
    }
}

fn endpoint_from_env(provider: LlmProvider) -> Result<String, AiLlmError> {
    let endpoint =
        env_opt_string("LLM_ENDPOINT").unwrap_or_else(|| provider.default_endpoint().to_string());
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;
    Ok(endpoint)
}

/// Constructs the config for the **text** role.
///
/// # Env
/// - `LLM_MODEL`, `LLM_MAX_TOKENS`, `LLM_TEMPERATURE`, `LLM_TIMEOUT_SECS`
///
/// # Errors
/// [`ConfigError`] for malformed values. A missing API key is not an error.
pub fn config_text() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let endpoint = endpoint_from_env(provider)?;
    let model = env_opt_string("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let temperature = env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("LLM_TEMPERATURE", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: env_opt_string(provider.api_key_var()),
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?,
    })
}

/// Constructs the config for the **vision** role.
///
/// Same endpoint and key as the text role; `temperature` is left unset so the
/// field is omitted from image requests.
pub fn config_vision() -> Result<LlmModelConfig, AiLlmError> {
    let text = config_text()?;
    let model = env_opt_string("LLM_VISION_MODEL").unwrap_or_else(|| text.model.clone());

    Ok(LlmModelConfig {
        model,
        temperature: None,
        ..text
    })
}
