//! Per-column numeric scalers.
//!
//! Both scalers learn a center and a scale per column and map each value to
//! `(v - center) / scale`. They keep column identity, so they do not generate
//! output names.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::table::{Table, Value};
use crate::transform::{
    check_not_empty, check_width, numeric_values, quantile, sorted, ColumnTransform, FeatureNames,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Fitted {
    center: Vec<f64>,
    scale: Vec<f64>,
}

fn apply(name: &str, fitted: &Option<Fitted>, table: &Table) -> Result<Table> {
    let fitted = fitted
        .as_ref()
        .ok_or_else(|| FeatureError::NotFitted(name.to_string()))?;
    check_width(name, fitted.center.len(), table)?;

    let mut out = Table::default();
    for (idx, (column, values)) in table.columns().enumerate() {
        let scaled = numeric_values(column, values)?
            .into_iter()
            .map(|v| Value::Number((v - fitted.center[idx]) / fitted.scale[idx]))
            .collect();
        out.push_column(column, scaled)?;
    }
    Ok(out)
}

/// Standardization to zero mean and unit (population) variance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fitted: Option<Fitted>,
}

impl StandardScaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.center.as_slice())
    }

    pub fn std(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.scale.as_slice())
    }
}

impl ColumnTransform for StandardScaler {
    fn name(&self) -> &'static str {
        "StandardScaler"
    }

    fn fit(&mut self, table: &Table, _target: Option<&[f64]>) -> Result<()> {
        check_not_empty(self.name(), table)?;
        let mut mean = Vec::with_capacity(table.ncols());
        let mut std = Vec::with_capacity(table.ncols());
        for (column, values) in table.columns() {
            let x = numeric_values(column, values)?;
            let n = x.len() as f64;
            let m = x.iter().sum::<f64>() / n;
            let var = x.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n;
            mean.push(m);
            std.push(var.sqrt().max(Self::MIN_STD));
        }
        self.fitted = Some(Fitted {
            center: mean,
            scale: std,
        });
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        apply(self.name(), &self.fitted, table)
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn feature_names(&self) -> FeatureNames {
        FeatureNames::Unsupported
    }
}

/// Scaling by median and interquartile range, robust to outliers such as
/// extreme incomes or employment-day sentinels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobustScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fitted: Option<Fitted>,
}

impl RobustScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn median(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.center.as_slice())
    }

    pub fn iqr(&self) -> Option<&[f64]> {
        self.fitted.as_ref().map(|f| f.scale.as_slice())
    }
}

impl ColumnTransform for RobustScaler {
    fn name(&self) -> &'static str {
        "RobustScaler"
    }

    fn fit(&mut self, table: &Table, _target: Option<&[f64]>) -> Result<()> {
        check_not_empty(self.name(), table)?;
        let mut median = Vec::with_capacity(table.ncols());
        let mut iqr = Vec::with_capacity(table.ncols());
        for (column, values) in table.columns() {
            let x = sorted(numeric_values(column, values)?);
            median.push(quantile(&x, 0.5));
            let spread = quantile(&x, 0.75) - quantile(&x, 0.25);
            // A constant column keeps its offset but is not rescaled.
            iqr.push(if spread == 0.0 { 1.0 } else { spread });
        }
        self.fitted = Some(Fitted {
            center: median,
            scale: iqr,
        });
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        apply(self.name(), &self.fitted, table)
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn feature_names(&self) -> FeatureNames {
        FeatureNames::Unsupported
    }
}
