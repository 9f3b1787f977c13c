use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::Table;
use crate::transform::{ColumnTransform, FeatureNames, Transformer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStage {
    pub name: String,
    pub transformer: Transformer,
}

impl NamedStage {
    pub fn new<N: Into<String>, T: Into<Transformer>>(name: N, transformer: T) -> Self {
        Self {
            name: name.into(),
            transformer: transformer.into(),
        }
    }
}

/// Ordered chain of stages applied to the same column subset, e.g.
/// impute-missing then scale. Each stage fits on the previous stage's output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<NamedStage>,
}

impl Pipeline {
    pub fn new(stages: Vec<NamedStage>) -> Self {
        Self { stages }
    }

    pub fn last_stage(&self) -> Option<&NamedStage> {
        self.stages.last()
    }
}

impl ColumnTransform for Pipeline {
    fn name(&self) -> &'static str {
        "Pipeline"
    }

    fn fit(&mut self, table: &Table, target: Option<&[f64]>) -> Result<()> {
        let mut current = table.clone();
        let n_stages = self.stages.len();
        for (idx, stage) in self.stages.iter_mut().enumerate() {
            log::debug!("fitting pipeline stage '{}'", stage.name);
            stage.transformer.fit(&current, target)?;
            if idx + 1 < n_stages {
                current = stage.transformer.transform(&current)?;
            }
        }
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let mut current = table.clone();
        for stage in &self.stages {
            current = stage.transformer.transform(&current)?;
        }
        Ok(current)
    }

    fn is_fitted(&self) -> bool {
        self.stages.iter().all(|s| s.transformer.is_fitted())
    }

    /// Name generation is decided by the last stage alone.
    fn feature_names(&self) -> FeatureNames {
        match self.stages.last() {
            Some(stage) => stage.transformer.feature_names(),
            None => FeatureNames::Unsupported,
        }
    }

    fn output_width(&self, n_inputs: usize) -> usize {
        self.stages
            .iter()
            .fold(n_inputs, |width, stage| stage.transformer.output_width(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use crate::transform::{ImputeStrategy, OneHotEncoder, RobustScaler, SimpleImputer};

    #[test]
    fn stages_chain_and_last_stage_names() {
        let t = Table::from_columns(vec![(
            "NAME_HOUSING_TYPE",
            vec!["House".into(), Value::Missing, "Rented".into(), "House".into()],
        )])
        .unwrap();
        let mut p = Pipeline::new(vec![
            NamedStage::new("imputer", SimpleImputer::new(ImputeStrategy::MostFrequent)),
            NamedStage::new("onehot", OneHotEncoder::new()),
        ]);
        assert!(!p.is_fitted());
        p.fit(&t, None).unwrap();
        assert!(p.is_fitted());

        let m = p.transform(&t).unwrap().to_matrix().unwrap();
        assert_eq!(m.shape(), (4, 2));
        assert_eq!(m.row_slice(1), &[1.0, 0.0]);
        assert_eq!(
            p.feature_names(),
            FeatureNames::Generated(vec!["x0_House".into(), "x0_Rented".into()])
        );
        assert_eq!(p.output_width(1), 2);
    }

    #[test]
    fn scaler_last_means_no_generated_names() {
        let t = Table::from_columns(vec![(
            "DAYS_BIRTH",
            vec![Value::Number(-12000.0), Value::Missing, Value::Number(-15000.0)],
        )])
        .unwrap();
        let mut p = Pipeline::new(vec![
            NamedStage::new("imputer", SimpleImputer::new(ImputeStrategy::Median)),
            NamedStage::new("scaler", RobustScaler::new()),
        ]);
        p.fit(&t, None).unwrap();
        assert_eq!(p.feature_names(), FeatureNames::Unsupported);
        assert_eq!(p.last_stage().unwrap().name, "scaler");
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let t = Table::from_columns(vec![("a", vec![Value::Number(1.0)])]).unwrap();
        let mut p = Pipeline::default();
        p.fit(&t, None).unwrap();
        assert_eq!(p.transform(&t).unwrap(), t);
        assert_eq!(p.feature_names(), FeatureNames::Unsupported);
    }
}
