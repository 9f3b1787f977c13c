use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::Result;
use crate::math::Array2;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::logistic::LogisticRegression;

/// Serializable wrapper over the supported classifier models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
}

impl ClassifierModel for Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        match self {
            Classifier::LogisticRegression(m) => m.fit(x, y),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        match self {
            Classifier::LogisticRegression(m) => m.predict_proba(x),
        }
    }

    fn name(&self) -> &str {
        match self {
            Classifier::LogisticRegression(m) => m.name(),
        }
    }
}

/// Build an unfitted classifier from a `ModelConfig`.
pub fn build_model(params: &ModelConfig) -> Classifier {
    match params.model_type {
        ModelType::LogisticRegression {
            max_iter,
            l2_penalty,
            tolerance,
        } => Classifier::LogisticRegression(LogisticRegression::new(
            params.learning_rate,
            max_iter,
            l2_penalty,
            tolerance,
        )),
    }
}
