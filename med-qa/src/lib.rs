//! Medical question answering over an ingested PDF encyclopedia.
//!
//! [`MedQa`] owns the long-lived handles (embedding model, vector index,
//! chat client). Build it once with [`MedQa::init`], wrap it in `Arc`, and
//! share it:
//! - [`MedQa::answer`]: retrieve top-K chunks, ask the LLM with them as context.
//! - [`MedQa::answer_with_score`]: same, plus ROUGE scores against a reference.
//! - [`MedQa::analyze_image`]: send an uploaded image to the vision profile.
//! - [`MedQa::ingest`]: load the PDF directory into the index.

mod api_types;
pub mod cfg;
mod error;
pub mod image_payload;
pub mod prompt;

pub use api_types::{ScoredAnswer, UsedChunk};
pub use cfg::MedQaConfig;
pub use error::MedQaError;

use std::{sync::Arc, time::Instant};

use ai_llm_service::service_profiles::LlmServiceProfiles;
use rag_store::{IngestStats, RagHit, RagQuery, RagStore};
use tracing::{debug, info, trace};

/// The question-answering service.
pub struct MedQa {
    cfg: MedQaConfig,
    rag: RagStore,
    llm: Arc<LlmServiceProfiles>,
}

impl MedQa {
    /// Loads the embedding model, builds the index and chat clients, and
    /// makes sure the index exists.
    ///
    /// # Errors
    /// Model loading, client construction or index creation failures.
    pub async fn init(cfg: MedQaConfig) -> Result<Self, MedQaError> {
        let started = Instant::now();
        let rag = RagStore::connect(cfg.rag.clone()).await?;
        let llm = Arc::new(LlmServiceProfiles::new(
            cfg.llm_text.clone(),
            cfg.llm_vision.clone(),
        )?);
        rag.ensure_index().await?;

        info!(
            index = %rag.index_name(),
            model = %cfg.llm_text.model,
            endpoint = %cfg.llm_text.endpoint,
            pdf_dir = %cfg.pdf_dir.display(),
            latency_ms = started.elapsed().as_millis(),
            "med-qa initialized"
        );
        Ok(Self { cfg, rag, llm })
    }

    /// Assembles the service from ready-made parts. Nothing is contacted.
    pub fn with_parts(cfg: MedQaConfig, rag: RagStore, llm: Arc<LlmServiceProfiles>) -> Self {
        Self { cfg, rag, llm }
    }

    /// Releases the model and clients.
    pub fn teardown(self) {
        info!(index = %self.rag.index_name(), "med-qa shut down");
    }

    pub fn config(&self) -> &MedQaConfig {
        &self.cfg
    }

    /// Default number of chunks retrieved per question.
    pub fn top_k(&self) -> u64 {
        self.cfg.top_k
    }

    /// Ingests every PDF in the configured directory.
    ///
    /// # Errors
    /// I/O, embedding or index failures.
    pub async fn ingest(&self) -> Result<IngestStats, MedQaError> {
        Ok(self.rag.ingest_dir(&self.cfg.pdf_dir).await?)
    }

    /// Returns the `k` most similar chunks, highest score first.
    pub async fn retrieve(&self, question: &str, k: u64) -> Result<Vec<RagHit>, MedQaError> {
        trace!(k, "MedQa::retrieve");
        Ok(self.rag.rag_context(RagQuery { text: question, top_k: k }).await?)
    }

    /// Answers `question` using the `k` most similar chunks as context.
    ///
    /// # Errors
    /// [`MedQaError::InvalidInput`] for a blank question; retrieval and
    /// chat errors are passed through.
    pub async fn answer(&self, question: &str, k: u64) -> Result<String, MedQaError> {
        let (answer, _) = self.answer_with_context(question, k).await?;
        Ok(answer)
    }

    /// Answers and, when a reference answer is given, scores the answer against it.
    pub async fn answer_with_score(
        &self,
        question: &str,
        reference: Option<&str>,
        k: u64,
    ) -> Result<ScoredAnswer, MedQaError> {
        let (answer, hits) = self.answer_with_context(question, k).await?;
        let scores = reference
            .filter(|r| !r.trim().is_empty())
            .map(|r| answer_eval::score(r, &answer));
        Ok(ScoredAnswer {
            answer,
            scores,
            context: hits.into_iter().map(UsedChunk::from).collect(),
        })
    }

    async fn answer_with_context(
        &self,
        question: &str,
        k: u64,
    ) -> Result<(String, Vec<RagHit>), MedQaError> {
        if question.trim().is_empty() {
            return Err(MedQaError::InvalidInput("question is empty".into()));
        }
        let started = Instant::now();

        let hits = self.retrieve(question, k).await?;
        let context = prompt::build_context(&hits);
        let user = prompt::build_user_prompt(question, &context);
        debug!(
            chunks = hits.len(),
            context_len = context.len(),
            prompt_len = user.len(),
            "built prompt"
        );

        let answer = self
            .llm
            .generate_text(&user, Some(prompt::SYSTEM_PROMPT))
            .await?;

        info!(
            k,
            chunks = hits.len(),
            answer_len = answer.len(),
            latency_ms = started.elapsed().as_millis(),
            "question answered"
        );
        Ok((answer, hits))
    }

    /// Describes an uploaded image (any format the `image` crate decodes).
    ///
    /// # Errors
    /// [`MedQaError::Image`] for undecodable bytes; chat errors are passed through.
    pub async fn analyze_image(&self, bytes: Vec<u8>) -> Result<String, MedQaError> {
        let started = Instant::now();
        let size = bytes.len();
        let data_uri =
            tokio::task::spawn_blocking(move || image_payload::to_jpeg_data_uri(&bytes)).await??;
        debug!(bytes = size, data_uri_len = data_uri.len(), "encoded image");

        let analysis = self
            .llm
            .describe_image(&data_uri, Some(prompt::IMAGE_SYSTEM_PROMPT))
            .await?;

        info!(
            bytes = size,
            analysis_len = analysis.len(),
            latency_ms = started.elapsed().as_millis(),
            "image analyzed"
        );
        Ok(analysis)
    }
}
