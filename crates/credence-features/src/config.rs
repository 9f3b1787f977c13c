use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::column_transformer::{FeatureSets, NamedColumnTransformer, TransformStep};
use crate::error::{FeatureError, Result};
use crate::transform::{
    HandleUnknown, ImputeStrategy, NamedStage, OneHotEncoder, Pipeline, RobustScaler,
    SimpleImputer, Transformer, WoeEncoder,
};

/// Central configuration for the classifier.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub learning_rate: f64,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    LogisticRegression {
        max_iter: usize,
        l2_penalty: f64,
        tolerance: f64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::LogisticRegression {
            max_iter: 500,
            l2_penalty: 1e-4,
            tolerance: 1e-6,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" | "logreg" | "logistic_regression" => Ok(ModelType::default()),
            _ => Err(format!(
                "Unknown model type: {}. Supported: logistic_regression",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f64, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}

/// One of the declared feature groups.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Numeric,
    Categorical,
    Special,
}

/// Columns of a step: either a declared feature group or an explicit list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Columns {
    Group(FeatureGroup),
    List(Vec<String>),
}

/// A step as written in configuration: a single `transformer` or a list of
/// `stages` forming a pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StepConfig {
    pub name: String,
    pub columns: Columns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<Transformer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<NamedStage>,
}

impl StepConfig {
    fn pipeline(name: &str, columns: FeatureGroup, stages: Vec<NamedStage>) -> Self {
        StepConfig {
            name: name.to_string(),
            columns: Columns::Group(columns),
            transformer: None,
            stages,
        }
    }
}

fn default_hard_mode() -> bool {
    true
}

/// Column transformer layout. Lists left out of a config file are empty;
/// the credit preset is only used when the whole section is absent.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TransformerConfig {
    #[serde(default)]
    pub numeric_features: Vec<String>,
    #[serde(default)]
    pub categorical_features: Vec<String>,
    #[serde(default)]
    pub special_features: Vec<String>,
    #[serde(default = "default_hard_mode")]
    pub hard_mode: bool,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for TransformerConfig {
    /// Preprocessing for the credit-application features served by the API.
    fn default() -> Self {
        Self {
            numeric_features: owned(&[
                "CNT_CHILDREN",
                "AMT_INCOME_TOTAL",
                "DAYS_BIRTH",
                "DAYS_EMPLOYED",
                "CNT_FAM_MEMBERS",
            ]),
            categorical_features: owned(&[
                "CODE_GENDER",
                "FLAG_OWN_CAR",
                "FLAG_OWN_REALTY",
                "NAME_INCOME_TYPE",
                "NAME_EDUCATION_TYPE",
                "NAME_FAMILY_STATUS",
                "NAME_HOUSING_TYPE",
                "FLAG_MOBIL",
                "FLAG_WORK_PHONE",
                "FLAG_PHONE",
                "FLAG_EMAIL",
            ]),
            special_features: owned(&["OCCUPATION_TYPE"]),
            hard_mode: default_hard_mode(),
            steps: vec![
                StepConfig::pipeline(
                    "numeric",
                    FeatureGroup::Numeric,
                    vec![
                        NamedStage::new("imputer", SimpleImputer::new(ImputeStrategy::Median)),
                        NamedStage::new("scaler", RobustScaler::new()),
                    ],
                ),
                StepConfig::pipeline(
                    "categorical",
                    FeatureGroup::Categorical,
                    vec![
                        NamedStage::new(
                            "imputer",
                            SimpleImputer::new(ImputeStrategy::MostFrequent),
                        ),
                        NamedStage::new(
                            "onehot",
                            OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore),
                        ),
                    ],
                ),
                StepConfig::pipeline(
                    "special",
                    FeatureGroup::Special,
                    vec![
                        NamedStage::new(
                            "imputer",
                            SimpleImputer::new(ImputeStrategy::MostFrequent),
                        ),
                        NamedStage::new("woe", WoeEncoder::new()),
                    ],
                ),
            ],
        }
    }
}

impl TransformerConfig {
    pub fn features(&self) -> FeatureSets {
        FeatureSets {
            numeric: self.numeric_features.clone(),
            categorical: self.categorical_features.clone(),
            special: self.special_features.clone(),
        }
    }

    fn resolve(&self, columns: &Columns) -> Vec<String> {
        match columns {
            Columns::Group(FeatureGroup::Numeric) => self.numeric_features.clone(),
            Columns::Group(FeatureGroup::Categorical) => self.categorical_features.clone(),
            Columns::Group(FeatureGroup::Special) => self.special_features.clone(),
            Columns::List(names) => names.clone(),
        }
    }

    /// Build an unfitted transformer. Group steps whose group is empty are
    /// left out.
    pub fn build(&self) -> Result<NamedColumnTransformer> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let transformer = match (&step.transformer, step.stages.is_empty()) {
                (Some(t), true) => t.clone(),
                (None, false) => Transformer::Pipeline(Pipeline::new(step.stages.clone())),
                (Some(_), false) => {
                    return Err(FeatureError::InvalidConfig(format!(
                        "step '{}' sets both 'transformer' and 'stages'",
                        step.name
                    )))
                }
                (None, true) => {
                    return Err(FeatureError::InvalidConfig(format!(
                        "step '{}' needs a 'transformer' or 'stages'",
                        step.name
                    )))
                }
            };
            let columns = self.resolve(&step.columns);
            if columns.is_empty() && matches!(step.columns, Columns::Group(_)) {
                log::debug!("skipping step '{}': its feature group is empty", step.name);
                continue;
            }
            steps.push(TransformStep::new(step.name.clone(), transformer, &columns));
        }
        Ok(NamedColumnTransformer::new(
            steps,
            self.features(),
            self.hard_mode,
        ))
    }
}

fn default_target() -> String {
    "TARGET".to_string()
}

fn default_validation_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Everything `credence train` needs besides the data file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TrainConfig {
    #[serde(default)]
    pub transformer: TransformerConfig,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub model: ModelConfig,
    /// Share of rows held out to report validation metrics.
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            transformer: TransformerConfig::default(),
            target: default_target(),
            model: ModelConfig::default(),
            validation_fraction: default_validation_fraction(),
            seed: default_seed(),
        }
    }
}

impl TrainConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: TrainConfig = serde_json::from_str(&raw)?;
        if !(0.0..1.0).contains(&config.validation_fraction) {
            return Err(FeatureError::InvalidConfig(format!(
                "validation_fraction must be in [0, 1), got {}",
                config.validation_fraction
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Table, Value};

    #[test]
    fn default_config_builds_three_pipelines() {
        let ct = TransformerConfig::default().build().unwrap();
        let names: Vec<&str> = ct.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["numeric", "categorical", "special"]);
        assert_eq!(ct.initial_features().len(), 17);
        assert!(ct.hard_mode());
    }

    #[test]
    fn step_columns_accept_group_or_list() {
        let json = r#"{
            "numeric_features": ["salary"],
            "steps": [
                {"name": "num", "columns": "numeric", "transformer": {"kind": "standard_scaler"}},
                {"name": "raw", "columns": ["salary"], "transformer": {"kind": "passthrough"}}
            ]
        }"#;
        let config: TransformerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.steps[0].columns, Columns::Group(FeatureGroup::Numeric));
        assert!(config.hard_mode);
        assert!(config.categorical_features.is_empty());
        assert!(config.special_features.is_empty());

        let mut ct = config.build().unwrap();
        assert_eq!(ct.steps()[1].columns, vec!["salary"]);
        assert_eq!(ct.initial_features(), &["salary"]);

        let table = Table::from_columns(vec![(
            "salary",
            vec![Value::from(10.0), 20.0.into(), 30.0.into()],
        )])
        .unwrap();
        ct.fit(&table, None).unwrap();
        assert_eq!(ct.final_features(), &["salary", "salary"]);
    }

    #[test]
    fn train_config_without_transformer_uses_credit_preset() {
        let config: TrainConfig = serde_json::from_str(r#"{"target": "y"}"#).unwrap();
        assert_eq!(config.transformer, TransformerConfig::default());
        assert_eq!(config.target, "y");

        let partial: TrainConfig =
            serde_json::from_str(r#"{"transformer": {"special_features": ["s"]}}"#).unwrap();
        assert!(partial.transformer.numeric_features.is_empty());
        assert!(partial.transformer.steps.is_empty());
        assert!(partial.transformer.hard_mode);
    }

    #[test]
    fn step_needs_exactly_one_body() {
        let config = TransformerConfig {
            steps: vec![StepConfig {
                name: "empty".to_string(),
                columns: Columns::List(vec!["a".to_string()]),
                transformer: None,
                stages: vec![],
            }],
            ..TransformerConfig::default()
        };
        assert!(matches!(
            config.build(),
            Err(FeatureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_groups_are_skipped() {
        let config = TransformerConfig {
            special_features: vec![],
            ..TransformerConfig::default()
        };
        assert_eq!(config.build().unwrap().steps().len(), 2);
    }

    #[test]
    fn model_type_from_str() {
        assert_eq!(
            "logistic_regression".parse::<ModelType>().unwrap(),
            ModelType::default()
        );
        assert!("gbdt".parse::<ModelType>().is_err());
    }

    #[test]
    fn model_config_json_layout() {
        let json = serde_json::to_value(ModelConfig::default()).unwrap();
        assert_eq!(json["learning_rate"], 0.1);
        assert_eq!(json["LogisticRegression"]["max_iter"], 500);
    }
}
