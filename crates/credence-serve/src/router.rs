use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::SharedState;

/// Build the service router. Prediction routes live under the configured
/// API version prefix, e.g. `/v1/predict`.
pub fn create_router(state: SharedState) -> Router {
    let prefix = state.settings.api_prefix();
    Router::new()
        .route("/health", get(handlers::health::check))
        .route(
            &format!("{}/predict", prefix),
            post(handlers::predict::predict),
        )
        .route(
            &format!("{}/predict/batch", prefix),
            post(handlers::predict::predict_batch),
        )
        .route(
            &format!("{}/features", prefix),
            get(handlers::features::list),
        )
        .with_state(state)
}
