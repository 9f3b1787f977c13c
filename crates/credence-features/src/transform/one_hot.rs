//! One-hot encoding for categorical features.
//!
//! Each input column expands into one indicator column per category seen at
//! fit time. Generated names follow the `x{i}_{category}` placeholder scheme,
//! where `i` is the position of the input column inside the step.
use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::table::{Table, Value};
use crate::transform::{check_not_empty, check_width, ColumnTransform, FeatureNames};

/// What to do with a category that was not seen during fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Encode the row as all zeros for that column.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
    /// Category labels per input column, in output order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories: Option<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    pub fn categories(&self) -> Option<&[Vec<String>]> {
        self.categories.as_deref()
    }
}

/// Numbers sort numerically and before text; missing sorts last.
fn category_order(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            _ if v.is_missing() => 2,
            Value::Number(_) => 0,
            _ => 1,
        }
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if !a.is_missing() && !b.is_missing() => {
            x.total_cmp(y)
        }
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl ColumnTransform for OneHotEncoder {
    fn name(&self) -> &'static str {
        "OneHotEncoder"
    }

    fn fit(&mut self, table: &Table, _target: Option<&[f64]>) -> Result<()> {
        check_not_empty(self.name(), table)?;
        let categories = table
            .columns()
            .map(|(_, values)| {
                let mut distinct: Vec<&Value> = values.iter().collect();
                distinct.sort_by(|a, b| category_order(a, b));
                let mut seen = HashSet::new();
                distinct
                    .iter()
                    .map(|v| v.category_label())
                    .filter(|l| seen.insert(l.clone()))
                    .collect::<Vec<String>>()
            })
            .collect::<Vec<_>>();
        log::debug!(
            "OneHotEncoder learned {} categories over {} columns",
            categories.iter().map(Vec::len).sum::<usize>(),
            categories.len()
        );
        self.categories = Some(categories);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let categories = self
            .categories
            .as_ref()
            .ok_or_else(|| FeatureError::NotFitted(self.name().to_string()))?;
        check_width(self.name(), categories.len(), table)?;

        let mut out = Table::default();
        for (i, ((column, values), cats)) in table.columns().zip(categories).enumerate() {
            let labels: Vec<String> = values.iter().map(Value::category_label).collect();
            if self.handle_unknown == HandleUnknown::Error {
                if let Some(unknown) = labels.iter().find(|l| !cats.contains(l)) {
                    return Err(FeatureError::UnknownCategory {
                        column: column.to_string(),
                        category: unknown.clone(),
                    });
                }
            }
            for cat in cats {
                let indicator = labels
                    .iter()
                    .map(|l| Value::Number(if l == cat { 1.0 } else { 0.0 }))
                    .collect();
                // Positional names: `{column}_{cat}` can repeat across columns.
                out.push_column(format!("x{}_{}", i, cat), indicator)?;
            }
        }
        if out.ncols() == 0 {
            // Keep the row count even when nothing was produced.
            return Ok(table.select::<&str>(&[])?);
        }
        Ok(out)
    }

    fn is_fitted(&self) -> bool {
        self.categories.is_some()
    }

    fn feature_names(&self) -> FeatureNames {
        match &self.categories {
            None => FeatureNames::Unfitted,
            Some(categories) => FeatureNames::Generated(
                categories
                    .iter()
                    .enumerate()
                    .flat_map(|(i, cats)| cats.iter().map(move |c| format!("x{}_{}", i, c)))
                    .collect(),
            ),
        }
    }

    fn output_width(&self, n_inputs: usize) -> usize {
        match &self.categories {
            Some(categories) => categories.iter().map(Vec::len).sum(),
            None => n_inputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns(vec![
            ("CODE_GENDER", vec!["M".into(), "F".into(), "M".into()]),
            ("CNT_CHILDREN", vec![2.0.into(), 0.0.into(), 10.0.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn categories_are_sorted_per_column() {
        let mut enc = OneHotEncoder::new();
        enc.fit(&table(), None).unwrap();
        let cats = enc.categories().unwrap();
        assert_eq!(cats[0], vec!["F", "M"]);
        assert_eq!(cats[1], vec!["0", "2", "10"]);
    }

    #[test]
    fn generated_names_use_placeholders() {
        let mut enc = OneHotEncoder::new();
        assert_eq!(enc.feature_names(), FeatureNames::Unfitted);
        enc.fit(&table(), None).unwrap();
        assert_eq!(
            enc.feature_names(),
            FeatureNames::Generated(vec![
                "x0_F".into(),
                "x0_M".into(),
                "x1_0".into(),
                "x1_2".into(),
                "x1_10".into(),
            ])
        );
        assert_eq!(enc.output_width(2), 5);
    }

    #[test]
    fn transform_emits_indicators() {
        let mut enc = OneHotEncoder::new();
        enc.fit(&table(), None).unwrap();
        let m = enc.transform(&table()).unwrap().to_matrix().unwrap();
        assert_eq!(m.shape(), (3, 5));
        assert_eq!(m.row_slice(0), &[0.0, 1.0, 0.0, 1.0, 0.0]);
        assert_eq!(m.row_slice(2), &[0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_category_errors_or_zeroes() {
        let mut enc = OneHotEncoder::new();
        enc.fit(&table(), None).unwrap();
        let unseen = Table::from_columns(vec![
            ("CODE_GENDER", vec!["X".into()]),
            ("CNT_CHILDREN", vec![0.0.into()]),
        ])
        .unwrap();
        assert!(matches!(
            enc.transform(&unseen),
            Err(FeatureError::UnknownCategory { .. })
        ));

        let mut lenient = OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore);
        lenient.fit(&table(), None).unwrap();
        let m = lenient.transform(&unseen).unwrap().to_matrix().unwrap();
        assert_eq!(m.row_slice(0), &[0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn composed_names_may_overlap_across_columns() {
        // "a" + "b_c" and "a_b" + "c" both read as "a_b_c".
        let t = Table::from_columns(vec![
            ("a", vec!["b_c".into(), "z".into()]),
            ("a_b", vec!["c".into(), "y".into()]),
        ])
        .unwrap();
        let mut enc = OneHotEncoder::new();
        enc.fit(&t, None).unwrap();
        let m = enc.transform(&t).unwrap().to_matrix().unwrap();
        assert_eq!(m.shape(), (2, 4));
        assert_eq!(m.row_slice(0), &[1.0, 0.0, 1.0, 0.0]);
        assert_eq!(m.row_slice(1), &[0.0, 1.0, 0.0, 1.0]);
    }
}
