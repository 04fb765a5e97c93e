use std::sync::Arc;

use ai_llm_service::telemetry;
use anyhow::Context;
use med_qa::{MedQa, MedQaConfig};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments pass plain env vars.
    let dotenv = dotenvy::dotenv();

    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", level))
        .with(telemetry::layer())
        .init();

    if let Err(e) = dotenv {
        warn!(error = %e, "no .env loaded, using process environment");
    }

    let cfg = MedQaConfig::from_env().context("invalid configuration")?;
    let qa = Arc::new(MedQa::init(cfg).await.context("startup failed")?);

    api::start(qa.clone()).await.context("api server failed")?;

    match Arc::try_unwrap(qa) {
        Ok(qa) => qa.teardown(),
        Err(_) => info!("background tasks still hold the service; exiting"),
    }
    Ok(())
}
