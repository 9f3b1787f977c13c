//! `credence train`: fit a prediction pipeline from a CSV file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use credence_features::config::TrainConfig;
use credence_features::data_handling::{accuracy, split_target, train_validation_split};
use credence_features::io::{read_table_csv, write_table_csv};
use credence_features::PredictionPipeline;

use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub model_path: PathBuf,
    pub final_features: Vec<String>,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub validation_accuracy: Option<f64>,
}

/// Read a training config, falling back to the default when `path` is `None`.
pub fn load_train_config(path: Option<&Path>) -> Result<TrainConfig> {
    match path {
        Some(path) => TrainConfig::from_json_file(path)
            .with_context(|| format!("Failed to read training config: {}", path.display())),
        None => Ok(TrainConfig::default()),
    }
}

pub fn run_training(
    config: &TrainConfig,
    data_path: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<TrainSummary> {
    let table = read_table_csv(data_path)
        .with_context(|| format!("Failed to read training data: {}", data_path.display()))?;
    let (train, validation) =
        train_validation_split(&table, config.validation_fraction, config.seed);

    let model_dir = &settings.model_dir;
    fs::create_dir_all(model_dir)
        .with_context(|| format!("Failed to create {}", model_dir.display()))?;
    write_table_csv(model_dir.join(settings.dataset_train_filename()), &train)?;
    write_table_csv(model_dir.join(settings.dataset_validation_filename()), &validation)?;

    let pipeline = PredictionPipeline::train(config, &train).context("Training failed")?;

    let validation_accuracy = if validation.nrows() > 0 {
        let (features, y) = split_target(&validation, &config.target)?;
        let predicted = pipeline.predict(&features, settings.prediction_threshold)?;
        let acc = accuracy(&predicted, &y);
        log::info!(
            "Validation accuracy on {} rows: {:.4}",
            validation.nrows(),
            acc
        );
        Some(acc)
    } else {
        None
    };

    let preprocessor_path = model_dir.join(settings.preprocessor_filename());
    fs::write(
        &preprocessor_path,
        serde_json::to_string_pretty(&pipeline.transformer)?,
    )
    .with_context(|| format!("Failed to write {}", preprocessor_path.display()))?;
    let estimator_path = model_dir.join(settings.trained_best_estimator_filename());
    fs::write(&estimator_path, serde_json::to_string_pretty(&pipeline.model)?)
        .with_context(|| format!("Failed to write {}", estimator_path.display()))?;

    let model_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.model_path());
    pipeline.save(&model_path)?;

    log::info!(
        "Final features ({}): {}",
        pipeline.metadata.final_features.len(),
        pipeline.metadata.final_features.join(", ")
    );

    Ok(TrainSummary {
        model_path,
        final_features: pipeline.metadata.final_features.clone(),
        train_rows: train.nrows(),
        validation_rows: validation.nrows(),
        validation_accuracy,
    })
}
