//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use credence_features::table::{Record, Table};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::observation::Observation;
use crate::state::SharedState;

fn default_proba() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Return probabilities instead of 0/1 labels.
    #[serde(default = "default_proba")]
    pub proba: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Prediction {
    Probability { probability: f64 },
    Class { class: u8 },
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub predictions: Vec<Prediction>,
}

fn score(state: &SharedState, records: &[Record], proba: bool) -> AppResult<Vec<Prediction>> {
    let table = Table::from_records(records);
    let pipeline = &state.pipeline;
    let predictions = if proba {
        pipeline
            .predict_proba(&table)?
            .into_iter()
            .map(|probability| Prediction::Probability { probability })
            .collect()
    } else {
        pipeline
            .predict(&table, state.settings.prediction_threshold)?
            .into_iter()
            .map(|class| Prediction::Class { class })
            .collect()
    };
    Ok(predictions)
}

/// Score a single observation
pub async fn predict(
    State(state): State<SharedState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
    payload: Result<Json<Observation>, JsonRejection>,
) -> AppResult<Json<Prediction>> {
    let Query(query) = query?;
    let Json(observation) = payload?;
    let mut predictions = score(&state, &[observation.into_record()], query.proba)?;
    let prediction = predictions
        .pop()
        .ok_or_else(|| AppError::InternalError("model returned no prediction".to_string()))?;
    Ok(Json(prediction))
}

/// Score a batch; predictions keep the submission order
pub async fn predict_batch(
    State(state): State<SharedState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> AppResult<Json<BatchResponse>> {
    let Query(query) = query?;
    let Json(batch) = payload?;
    if batch.observations.is_empty() {
        return Err(AppError::BadRequest(
            "batch must contain at least one observation".to_string(),
        ));
    }
    let n = batch.observations.len();
    let records: Vec<Record> = batch
        .observations
        .into_iter()
        .map(Observation::into_record)
        .collect();
    let predictions = score(&state, &records, query.proba)?;
    if predictions.len() != n {
        return Err(AppError::InternalError(format!(
            "expected {} predictions, got {}",
            n,
            predictions.len()
        )));
    }
    log::debug!("scored batch of {} observations", n);
    Ok(Json(BatchResponse { predictions }))
}
