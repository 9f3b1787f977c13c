//! Atomic column transformers and multi-stage pipelines.
//!
//! Every transformer fits on the sub-table a step declares and maps it to a
//! new sub-table. Whether a transformer can describe its output columns is an
//! explicit capability, [`ColumnTransform::feature_names`], so callers branch
//! on [`FeatureNames`] instead of probing for failures.
pub mod impute;
pub mod one_hot;
pub mod pipeline;
pub mod scale;
pub mod woe;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::table::{Table, Value};

pub use impute::{ImputeStrategy, SimpleImputer};
pub use one_hot::{HandleUnknown, OneHotEncoder};
pub use pipeline::{NamedStage, Pipeline};
pub use scale::{RobustScaler, StandardScaler};
pub use woe::WoeEncoder;

/// Result of asking a transformer for its generated output names.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureNames {
    /// The transformer keeps column identity and does not generate names.
    Unsupported,
    /// The transformer generates names but has not been fitted.
    Unfitted,
    /// Placeholder based names (`x0`, `x1_A`, ...) in output column order.
    Generated(Vec<String>),
}

/// Contract shared by all atomic transformers.
pub trait ColumnTransform {
    fn name(&self) -> &'static str;

    /// Learn parameters from `table`; `target` is row-aligned when present.
    fn fit(&mut self, table: &Table, target: Option<&[f64]>) -> Result<()>;

    fn transform(&self, table: &Table) -> Result<Table>;

    fn is_fitted(&self) -> bool;

    fn feature_names(&self) -> FeatureNames;

    /// Number of output columns for `n_inputs` input columns once fitted.
    fn output_width(&self, n_inputs: usize) -> usize {
        n_inputs
    }
}

/// Any transformer a column step can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transformer {
    SimpleImputer(SimpleImputer),
    StandardScaler(StandardScaler),
    RobustScaler(RobustScaler),
    OneHotEncoder(OneHotEncoder),
    WoeEncoder(WoeEncoder),
    Pipeline(Pipeline),
    Passthrough,
}

impl Transformer {
    /// The transformer that actually produces this step's output: the last
    /// stage of a pipeline (recursively), or `self`.
    pub fn final_stage(&self) -> &Transformer {
        match self {
            Transformer::Pipeline(p) => match p.stages.last() {
                Some(stage) => stage.transformer.final_stage(),
                None => self,
            },
            other => other,
        }
    }
}

impl ColumnTransform for Transformer {
    fn name(&self) -> &'static str {
        match self {
            Transformer::SimpleImputer(t) => t.name(),
            Transformer::StandardScaler(t) => t.name(),
            Transformer::RobustScaler(t) => t.name(),
            Transformer::OneHotEncoder(t) => t.name(),
            Transformer::WoeEncoder(t) => t.name(),
            Transformer::Pipeline(t) => t.name(),
            Transformer::Passthrough => "Passthrough",
        }
    }

    fn fit(&mut self, table: &Table, target: Option<&[f64]>) -> Result<()> {
        match self {
            Transformer::SimpleImputer(t) => t.fit(table, target),
            Transformer::StandardScaler(t) => t.fit(table, target),
            Transformer::RobustScaler(t) => t.fit(table, target),
            Transformer::OneHotEncoder(t) => t.fit(table, target),
            Transformer::WoeEncoder(t) => t.fit(table, target),
            Transformer::Pipeline(t) => t.fit(table, target),
            Transformer::Passthrough => Ok(()),
        }
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        match self {
            Transformer::SimpleImputer(t) => t.transform(table),
            Transformer::StandardScaler(t) => t.transform(table),
            Transformer::RobustScaler(t) => t.transform(table),
            Transformer::OneHotEncoder(t) => t.transform(table),
            Transformer::WoeEncoder(t) => t.transform(table),
            Transformer::Pipeline(t) => t.transform(table),
            Transformer::Passthrough => Ok(table.clone()),
        }
    }

    fn is_fitted(&self) -> bool {
        match self {
            Transformer::SimpleImputer(t) => t.is_fitted(),
            Transformer::StandardScaler(t) => t.is_fitted(),
            Transformer::RobustScaler(t) => t.is_fitted(),
            Transformer::OneHotEncoder(t) => t.is_fitted(),
            Transformer::WoeEncoder(t) => t.is_fitted(),
            Transformer::Pipeline(t) => t.is_fitted(),
            Transformer::Passthrough => true,
        }
    }

    fn feature_names(&self) -> FeatureNames {
        match self {
            Transformer::SimpleImputer(t) => t.feature_names(),
            Transformer::StandardScaler(t) => t.feature_names(),
            Transformer::RobustScaler(t) => t.feature_names(),
            Transformer::OneHotEncoder(t) => t.feature_names(),
            Transformer::WoeEncoder(t) => t.feature_names(),
            Transformer::Pipeline(t) => t.feature_names(),
            Transformer::Passthrough => FeatureNames::Unsupported,
        }
    }

    fn output_width(&self, n_inputs: usize) -> usize {
        match self {
            Transformer::SimpleImputer(t) => t.output_width(n_inputs),
            Transformer::StandardScaler(t) => t.output_width(n_inputs),
            Transformer::RobustScaler(t) => t.output_width(n_inputs),
            Transformer::OneHotEncoder(t) => t.output_width(n_inputs),
            Transformer::WoeEncoder(t) => t.output_width(n_inputs),
            Transformer::Pipeline(t) => t.output_width(n_inputs),
            Transformer::Passthrough => n_inputs,
        }
    }
}

macro_rules! impl_from_transformer {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Transformer {
                fn from(t: $ty) -> Self {
                    Transformer::$ty(t)
                }
            }
        )*
    };
}

impl_from_transformer!(
    SimpleImputer,
    StandardScaler,
    RobustScaler,
    OneHotEncoder,
    WoeEncoder,
    Pipeline
);

/// Numeric view of a column; text or missing cells are rejected.
pub(crate) fn numeric_values(column: &str, values: &[Value]) -> Result<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| match v {
            Value::Number(n) if !n.is_nan() => Ok(*n),
            Value::Text(s) => Err(FeatureError::InvalidValue {
                column: column.to_string(),
                reason: format!("non-numeric value '{}' at row {}", s, row),
            }),
            _ => Err(FeatureError::InvalidValue {
                column: column.to_string(),
                reason: format!("missing value at row {}; impute before scaling", row),
            }),
        })
        .collect()
}

/// Reject inputs whose width differs from the fitted width.
pub(crate) fn check_width(name: &str, expected: usize, table: &Table) -> Result<()> {
    if table.ncols() != expected {
        return Err(FeatureError::ShapeMismatch {
            expected: format!("{} input columns for {}", expected, name),
            got: format!("{} columns", table.ncols()),
        });
    }
    Ok(())
}

pub(crate) fn check_not_empty(name: &str, table: &Table) -> Result<()> {
    if table.nrows() == 0 {
        return Err(FeatureError::EmptyData(format!(
            "cannot fit {} on an empty table",
            name
        )));
    }
    Ok(())
}

/// Quantile with linear interpolation between closest ranks. `sorted` must
/// be non-empty and ascending.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub(crate) fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values
}
