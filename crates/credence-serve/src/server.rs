use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use credence_features::PredictionPipeline;

use crate::router::create_router;
use crate::settings::Settings;
use crate::state::AppState;

/// Load the pipeline at `model_path` and serve it until the process stops.
pub async fn serve(settings: Settings, model_path: &Path) -> Result<()> {
    let pipeline = PredictionPipeline::load(model_path)
        .with_context(|| format!("Failed to load pipeline from {}", model_path.display()))?;
    log::info!(
        "Loaded pipeline (etl {}, model {}) with {} output features",
        pipeline.metadata.etl_version,
        pipeline.metadata.model_version,
        pipeline.metadata.final_features.len()
    );
    if pipeline.metadata.etl_version != settings.etl_version {
        log::warn!(
            "Pipeline was built with ETL version {} but settings expect {}",
            pipeline.metadata.etl_version,
            settings.etl_version
        );
    }

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", settings.host, settings.port))?;
    let app = create_router(Arc::new(AppState::new(pipeline, settings)));

    log::info!("Server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
