//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use ai_llm_service::config::{
    default_config::{config_text, config_vision},
    llm_model_config::LlmModelConfig,
};
use rag_store::RagConfig;

use crate::error::MedQaError;

/// Config bag for the service. All fields have defaults via `from_env`.
#[derive(Clone, Debug)]
pub struct MedQaConfig {
    /// Index, embedding, chunking and batching knobs.
    pub rag: RagConfig,
    /// Chat profile for grounded answers.
    pub llm_text: LlmModelConfig,
    /// Chat profile for image analysis (`None` = text profile without temperature).
    pub llm_vision: Option<LlmModelConfig>,
    /// Directory scanned by ingestion.
    pub pdf_dir: PathBuf,
    /// Chunks retrieved per question when the caller does not say.
    pub top_k: u64,
}

impl MedQaConfig {
    /// Build from environment variables with defaults.
    ///
    /// # Errors
    /// Malformed values only; absent API keys surface on the first remote call.
    pub fn from_env() -> Result<Self, MedQaError> {
        Ok(Self {
            rag: RagConfig::from_env()?,
            llm_text: config_text()?,
            llm_vision: Some(config_vision()?),
            pdf_dir: PathBuf::from(env("PDF_DIR", "encyclopedia_pdf")),
            top_k: parse("RAG_TOP_K", 5)?,
        })
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> Result<T, MedQaError> {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| MedQaError::Config(format!("{k} has an invalid value: `{v}`"))),
        _ => Ok(dflt),
    }
}
