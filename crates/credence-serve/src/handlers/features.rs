use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Serialize)]
pub struct FeaturesResponse {
    hard_mode: bool,
    initial_features: Vec<String>,
    final_features: Vec<String>,
}

/// Input columns the served transformer expects and the columns it produces.
pub async fn list(State(state): State<SharedState>) -> Json<FeaturesResponse> {
    let transformer = &state.pipeline.transformer;
    Json(FeaturesResponse {
        hard_mode: transformer.hard_mode(),
        initial_features: transformer.initial_features().to_vec(),
        final_features: transformer.final_features().to_vec(),
    })
}
