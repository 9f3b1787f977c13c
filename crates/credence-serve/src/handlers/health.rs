//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_version: String,
    etl_version: String,
    timestamp: i64,
}

pub async fn check(State(state): State<SharedState>) -> Json<HealthResponse> {
    let metadata = &state.pipeline.metadata;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_version: metadata.model_version.clone(),
        etl_version: metadata.etl_version.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
