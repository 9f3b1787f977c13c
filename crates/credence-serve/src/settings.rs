//! Service settings resolved from the environment.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use colored::*;

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Runtime settings. Every field has a default so the service starts without
/// any environment; a `.env` file is honoured by the binary via `dotenvy`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Prefix of the prediction routes, e.g. `v1`.
    pub api_version: String,
    pub etl_version: String,
    pub model_version: String,
    pub model_dir: PathBuf,
    pub model_filename: String,
    pub host: String,
    pub port: u16,
    /// Probability at or above which a record is labelled 1.
    pub prediction_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through `lookup`; unset or unparsable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_version: lookup("API_VERSION").unwrap_or_else(|| "v1".to_string()),
            etl_version: lookup("ETL_VERSION").unwrap_or_else(|| "0.0.1".to_string()),
            model_version: lookup("MODEL_VERSION").unwrap_or_else(|| "0.0.1".to_string()),
            model_dir: lookup("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("models")),
            model_filename: lookup("MODEL_FILENAME").unwrap_or_else(|| "model.json".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(lookup("PORT"), 8000),
            prediction_threshold: parse_or(lookup("PREDICTION_THRESHOLD"), 0.5),
        }
    }

    pub fn dataset_train_filename(&self) -> &'static str {
        "dataset_train.csv"
    }

    pub fn dataset_validation_filename(&self) -> &'static str {
        "dataset_validation.csv"
    }

    pub fn preprocessor_filename(&self) -> String {
        format!("preprocessor_{}.json", self.etl_version)
    }

    pub fn trained_best_estimator_filename(&self) -> String {
        format!("trained_best_estimator_{}.json", self.etl_version)
    }

    /// Full path of the served pipeline artifact.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_filename)
    }

    /// Route prefix with a leading slash, e.g. `/v1`.
    pub fn api_prefix(&self) -> String {
        format!("/{}", self.api_version.trim_matches('/'))
    }

    /// Every setting, derived file names included, keyed by name.
    pub fn entries(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("API_VERSION", self.api_version.clone()),
            ("DATASET_TRAIN_FILENAME", self.dataset_train_filename().to_string()),
            (
                "DATASET_VALIDATION_FILENAME",
                self.dataset_validation_filename().to_string(),
            ),
            ("ETL_VERSION", self.etl_version.clone()),
            ("HOST", self.host.clone()),
            ("MODEL_DIR", self.model_dir.display().to_string()),
            ("MODEL_FILENAME", self.model_filename.clone()),
            ("MODEL_VERSION", self.model_version.clone()),
            ("PORT", self.port.to_string()),
            (
                "PREDICTION_THRESHOLD",
                self.prediction_threshold.to_string(),
            ),
            ("PREPROCESSOR_FILENAME", self.preprocessor_filename()),
            (
                "TRAINED_BEST_ESTIMATOR_FILENAME",
                self.trained_best_estimator_filename(),
            ),
        ])
    }

    pub fn print_settings(&self) {
        for (name, value) in self.entries() {
            println!("{}", format!("{}: {}", name, value).red().bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_environment() {
        let s = Settings::default();
        assert_eq!(s.api_version, "v1");
        assert_eq!(s.port, 8000);
        assert_eq!(s.prediction_threshold, 0.5);
        assert_eq!(s.model_path(), PathBuf::from("models").join("model.json"));
        assert_eq!(s.preprocessor_filename(), "preprocessor_0.0.1.json");
        assert_eq!(
            s.trained_best_estimator_filename(),
            "trained_best_estimator_0.0.1.json"
        );
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("API_VERSION", "v2"),
            ("ETL_VERSION", "1.2.0"),
            ("PORT", "not-a-port"),
            ("PREDICTION_THRESHOLD", "0.7"),
        ]);
        let s = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(s.api_prefix(), "/v2");
        assert_eq!(s.port, 8000);
        assert_eq!(s.prediction_threshold, 0.7);
        assert_eq!(s.preprocessor_filename(), "preprocessor_1.2.0.json");
    }

    #[test]
    fn entries_are_sorted_by_name() {
        let names: Vec<&str> = Settings::default().entries().into_keys().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"MODEL_FILENAME"));
    }
}
