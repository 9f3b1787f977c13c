use std::sync::Arc;

use credence_features::PredictionPipeline;

use crate::settings::Settings;

/// Shared, read-only application state. Handlers only read the pipeline, so
/// no lock is needed.
pub struct AppState {
    pub pipeline: PredictionPipeline,
    pub settings: Settings,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(pipeline: PredictionPipeline, settings: Settings) -> Self {
        Self { pipeline, settings }
    }
}
