//! OpenAI-compatible chat-completion client (Groq, OpenAI).
//!
//! Minimal, non-streaming client around the `/chat/completions` REST endpoint.
//! The URL is derived from `LlmModelConfig::endpoint`, which already carries the
//! API version segment:
//! - POST {endpoint}/chat/completions
//!
//! Two request shapes are supported:
//! - text: optional system message + user message with a plain string
//! - image: optional system message + user message with one `image_url` part,
//!   sent without a `temperature` field
//!
//! Constructor validation:
//! - `cfg.endpoint` must start with http:// or https://
//! - `cfg.api_key`, when present, must be a valid header value
//!
//! A missing API key is not rejected here; the provider answers 401 and the
//! status surfaces through [`ProviderErrorKind::HttpStatus`].

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet},
};

/// Thin client for an OpenAI-compatible chat API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (default headers, optional timeout).
///
/// High-level operations:
/// - [`OpenAiService::generate`]: text chat completion
/// - [`OpenAiService::analyze_image`]: chat completion over one image
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::Provider`] with `InvalidHeader` if the API key is not a valid header
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        // 1) Endpoint must use http/https.
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                cfg.provider,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        // 2) Default headers: JSON always, bearer only when a key is configured.
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(key) = &cfg.api_key {
            let value = header::HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                ProviderError::new(
                    cfg.provider,
                    ProviderErrorKind::InvalidHeader(format!("invalid API key header: {e}")),
                )
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }

        // 3) Timeout only when asked for; otherwise reqwest's default applies.
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let url_chat = format!("{}/chat/completions", endpoint.trim_end_matches('/'));

        info!(
            provider = ?cfg.provider,
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            has_api_key = cfg.api_key.is_some(),
            timeout_secs = ?cfg.timeout_secs,
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Returns the config this client was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs a **text** chat completion.
    ///
    /// `messages` = optional system message + user message with `prompt`.
    /// Mapped options from config: `model`, `temperature`, `top_p`, `max_tokens`.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` if no content is returned
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            has_system = system.is_some(),
            "POST {}", self.url_chat
        );
        let body = ChatCompletionRequest::text(&self.cfg, prompt, system);
        self.complete(&body).await
    }

    /// Performs a chat completion whose user message is a single image.
    ///
    /// `image_url` is passed verbatim; callers usually send a
    /// `data:image/jpeg;base64,...` URI. No `temperature` is sent.
    ///
    /// # Errors
    /// Same as [`OpenAiService::generate`].
    pub async fn analyze_image(
        &self,
        image_url: &str,
        system: Option<&str>,
    ) -> Result<String, AiLlmError> {
        debug!(
            model = %self.cfg.model,
            image_url_len = image_url.len(),
            has_system = system.is_some(),
            "POST {}", self.url_chat
        );
        let body = ChatCompletionRequest::image(&self.cfg, image_url, system);
        self.complete(&body).await
    }

    async fn complete(&self, body: &ChatCompletionRequest<'_>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let resp = self.client.post(&self.url_chat).json(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "chat/completions returned non-success status"
            );

            return Err(ProviderError::new(
                self.cfg.provider,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode chat/completions response"
                );
                return Err(ProviderError::new(
                    self.cfg.provider,
                    ProviderErrorKind::Decode(format!(
                        "serde error: {e}; expected `choices[0].message.content`"
                    )),
                )
                .into());
            }
        };

        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(self.cfg.provider, ProviderErrorKind::EmptyChoices))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            answer_len = content.len(),
            "chat completion completed"
        );

        Ok(content)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn text(cfg: &'a LlmModelConfig, prompt: &'a str, system: Option<&'a str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage::system(sys));
        }
        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Text(prompt),
        });

        Self {
            model: &cfg.model,
            messages,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }

    fn image(cfg: &'a LlmModelConfig, image_url: &'a str, system: Option<&'a str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage::system(sys));
        }
        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![ContentPart::ImageUrl {
                image_url: ImageUrl { url: image_url },
            }]),
        });

        Self {
            model: &cfg.model,
            messages,
            temperature: None,
            top_p: None,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    /// One of: "system" | "user" | "assistant"
    role: &'a str,
    content: MessageContent<'a>,
}

impl<'a> ChatMessage<'a> {
    fn system(text: &'a str) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text),
        }
    }
}

/// Plain string, or an array of typed parts for multimodal input.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

/// Minimal response for `/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
