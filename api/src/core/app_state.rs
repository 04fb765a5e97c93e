use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use med_qa::{MedQa, MedQaError};
use rag_store::IngestStats;
use tokio::sync::OnceCell;
use tracing::info;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub qa: Arc<MedQa>,
    /// Set once by the first successful ingestion; later runs reuse its stats.
    ingestion: OnceCell<IngestStats>,
}

impl AppState {
    pub fn new(qa: Arc<MedQa>) -> Self {
        Self {
            qa,
            ingestion: OnceCell::new(),
        }
    }

    /// Whether ingestion has completed in this process.
    pub fn ingested(&self) -> bool {
        self.ingestion.initialized()
    }

    /// Runs ingestion at most once per process.
    ///
    /// Returns the stats of the run that loaded the data and `true` when that
    /// run happened earlier. Concurrent callers wait for the same run; a
    /// failed run leaves the cell empty so the next call retries.
    pub async fn ensure_ingested(&self) -> Result<(IngestStats, bool), MedQaError> {
        let ran_here = AtomicBool::new(false);
        let stats = self
            .ingestion
            .get_or_try_init(|| async {
                ran_here.store(true, Ordering::Relaxed);
                self.qa.ingest().await
            })
            .await?;

        let already_loaded = !ran_here.load(Ordering::Relaxed);
        if already_loaded {
            info!("ingestion already done, skipping");
        }
        Ok((*stats, already_loaded))
    }
}
