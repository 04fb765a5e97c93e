//! OpenAI-compatible chat-completion client used by MediQuery.
//!
//! - [`service_profiles::LlmServiceProfiles`]: text + vision profiles, built once.
//! - [`services::open_ai_service::OpenAiService`]: the raw HTTP client.
//! - [`config`]: env-driven defaults (Groq endpoint, model, max tokens).
//! - [`error_handler`]: the unified [`AiLlmError`].
//! - [`telemetry`]: tracing layer shared by the workspace binary.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use error_handler::AiLlmError;
