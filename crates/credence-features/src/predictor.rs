//! A fitted transformer and classifier persisted together.
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::column_transformer::NamedColumnTransformer;
use crate::config::TrainConfig;
use crate::data_handling::split_target;
use crate::error::{FeatureError, Result};
use crate::models::{build_model, Classifier, ClassifierModel};
use crate::table::{Record, Table};

pub const ETL_VERSION: &str = "0.0.1";
pub const MODEL_VERSION: &str = "0.0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub etl_version: String,
    pub model_version: String,
    pub trained_at: DateTime<Utc>,
    pub target: String,
    pub final_features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPipeline {
    pub transformer: NamedColumnTransformer,
    pub model: Classifier,
    pub metadata: PipelineMetadata,
}

impl PredictionPipeline {
    /// Build the transformer from `config`, fit it on `table` (which must
    /// hold the target column) and fit the classifier on the result.
    pub fn train(config: &TrainConfig, table: &Table) -> Result<Self> {
        let (features, y) = split_target(table, &config.target)?;
        let mut transformer = config.transformer.build()?;
        let x = transformer.fit_transform(&features, Some(&y))?;

        let mut model = build_model(&config.model);
        model.fit(&x, &y)?;
        log::info!(
            "Trained {} on {} rows and {} features",
            model.name(),
            x.nrows(),
            x.ncols()
        );

        let metadata = PipelineMetadata {
            etl_version: ETL_VERSION.to_string(),
            model_version: MODEL_VERSION.to_string(),
            trained_at: Utc::now(),
            target: config.target.clone(),
            final_features: transformer.final_features().to_vec(),
        };
        Ok(Self {
            transformer,
            model,
            metadata,
        })
    }

    /// Positive-class probability per row, in row order.
    pub fn predict_proba(&self, table: &Table) -> Result<Vec<f64>> {
        let x = self.transformer.transform(table)?;
        self.model.predict_proba(&x)
    }

    pub fn predict(&self, table: &Table, threshold: f64) -> Result<Vec<u8>> {
        let x = self.transformer.transform(table)?;
        self.model.predict(&x, threshold)
    }

    pub fn predict_records(&self, records: &[Record]) -> Result<Vec<f64>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.predict_proba(&Table::from_records(records))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        log::info!("Saved prediction pipeline to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)?;
        let pipeline: PredictionPipeline = serde_json::from_str(&raw)?;
        if !pipeline.transformer.is_fitted() {
            return Err(FeatureError::NotFitted(format!(
                "transformer stored in {}",
                path.as_ref().display()
            )));
        }
        Ok(pipeline)
    }
}
