//! Shared LLM service with two profiles: `text` and `vision`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Reuses a single HTTP client when both profiles point at the same
//!   endpoint/key/timeout (the usual case: one Groq account, one model).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//! use ai_llm_service::config::default_config::{config_text, config_vision};
//!
//! # async fn run() -> Result<(), ai_llm_service::error_handler::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_text()?, Some(config_vision()?))?);
//! let txt = svc.generate_text("What is anemia?", Some("Be brief.")).await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::{
    config::llm_model_config::LlmModelConfig, error_handler::AiLlmError,
    services::open_ai_service::OpenAiService,
};

/// Shared service that manages the **text** and **vision** profiles.
pub struct LlmServiceProfiles {
    text: Arc<OpenAiService>,
    vision: Arc<OpenAiService>,
}

impl LlmServiceProfiles {
    /// Creates a new service.
    ///
    /// - `text`: profile for grounded answers.
    /// - `vision_opt`: profile for image analysis. If `None`, falls back to
    ///   `text` with the temperature removed.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if a client cannot be built.
    pub fn new(
        text: LlmModelConfig,
        vision_opt: Option<LlmModelConfig>,
    ) -> Result<Self, AiLlmError> {
        let vision = vision_opt.unwrap_or_else(|| LlmModelConfig {
            temperature: None,
            ..text.clone()
        });

        let text_cli = Arc::new(OpenAiService::new(text)?);
        let vision_cli = if same_client(text_cli.config(), &vision) {
            debug!("vision profile shares the text client");
            Arc::clone(&text_cli)
        } else {
            Arc::new(OpenAiService::new(vision)?)
        };

        Ok(Self {
            text: text_cli,
            vision: vision_cli,
        })
    }

    /// Generates text using the **text** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn generate_text(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, AiLlmError> {
        self.text.generate(prompt, system).await
    }

    /// Describes an image using the **vision** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the call fails.
    pub async fn describe_image(
        &self,
        image_url: &str,
        system: Option<&str>,
    ) -> Result<String, AiLlmError> {
        self.vision.analyze_image(image_url, system).await
    }

    /// Returns references to the current profiles `(text, vision)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (self.text.config(), self.vision.config())
    }
}

/// Two configs can share one client when everything but the sampling knobs matches.
///
/// `analyze_image` never sends a temperature, so a vision profile that only
/// differs from the text profile by temperature reuses the text client.
fn same_client(a: &LlmModelConfig, b: &LlmModelConfig) -> bool {
    a.provider == b.provider
        && a.endpoint == b.endpoint
        && a.model == b.model
        && a.api_key == b.api_key
        && a.timeout_secs == b.timeout_secs
        && a.max_tokens == b.max_tokens
}
