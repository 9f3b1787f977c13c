//! Weight-of-evidence encoding against a binary target.
//!
//! For category `c` with `pos_c` positive and `neg_c` negative rows, and
//! regularization `r`:
//!
//! ```text
//! woe(c) = ln( ((pos_c + r) / (pos + 2r)) / ((neg_c + r) / (neg + 2r)) )
//! ```
//!
//! Unknown and missing categories encode to 0.0, the neutral evidence.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::table::{Table, Value};
use crate::transform::{check_not_empty, check_width, ColumnTransform, FeatureNames};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoeEncoder {
    #[serde(default = "WoeEncoder::default_regularization")]
    pub regularization: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mapping: Option<Vec<BTreeMap<String, f64>>>,
}

impl Default for WoeEncoder {
    fn default() -> Self {
        Self {
            regularization: Self::default_regularization(),
            mapping: None,
        }
    }
}

impl WoeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    fn default_regularization() -> f64 {
        1.0
    }

    /// Learned category -> WoE mapping per input column.
    pub fn mapping(&self) -> Option<&[BTreeMap<String, f64>]> {
        self.mapping.as_deref()
    }
}

/// Validate a 0/1 target and return (positives, negatives).
fn binary_counts(name: &str, target: &[f64]) -> Result<(f64, f64)> {
    let mut pos = 0.0;
    let mut neg = 0.0;
    for (row, &y) in target.iter().enumerate() {
        if y == 1.0 {
            pos += 1.0;
        } else if y == 0.0 {
            neg += 1.0;
        } else {
            return Err(FeatureError::InvalidValue {
                column: "target".to_string(),
                reason: format!("{} expects a 0/1 target, got {} at row {}", name, y, row),
            });
        }
    }
    if pos == 0.0 || neg == 0.0 {
        return Err(FeatureError::InvalidValue {
            column: "target".to_string(),
            reason: format!("{} needs both classes in the target", name),
        });
    }
    Ok((pos, neg))
}

impl ColumnTransform for WoeEncoder {
    fn name(&self) -> &'static str {
        "WoeEncoder"
    }

    fn fit(&mut self, table: &Table, target: Option<&[f64]>) -> Result<()> {
        check_not_empty(self.name(), table)?;
        // Zero or negative smoothing turns single-class categories into ln(0).
        if !(self.regularization > 0.0) {
            return Err(FeatureError::InvalidValue {
                column: "regularization".to_string(),
                reason: format!("must be positive, got {}", self.regularization),
            });
        }
        let target = target.ok_or_else(|| FeatureError::MissingTarget(self.name().to_string()))?;
        if target.len() != table.nrows() {
            return Err(FeatureError::ShapeMismatch {
                expected: format!("{} target values", table.nrows()),
                got: format!("{} target values", target.len()),
            });
        }
        let (pos, neg) = binary_counts(self.name(), target)?;
        let r = self.regularization;

        let mut mapping = Vec::with_capacity(table.ncols());
        for (_, values) in table.columns() {
            let mut counts: BTreeMap<String, (f64, f64)> = BTreeMap::new();
            for (v, &y) in values.iter().zip(target) {
                if v.is_missing() {
                    continue;
                }
                let entry = counts.entry(v.category_label()).or_insert((0.0, 0.0));
                if y == 1.0 {
                    entry.0 += 1.0;
                } else {
                    entry.1 += 1.0;
                }
            }
            let woe = counts
                .into_iter()
                .map(|(label, (pos_c, neg_c))| {
                    let num = (pos_c + r) / (pos + 2.0 * r);
                    let den = (neg_c + r) / (neg + 2.0 * r);
                    (label, (num / den).ln())
                })
                .collect();
            mapping.push(woe);
        }
        self.mapping = Some(mapping);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let mapping = self
            .mapping
            .as_ref()
            .ok_or_else(|| FeatureError::NotFitted(self.name().to_string()))?;
        check_width(self.name(), mapping.len(), table)?;

        let mut out = Table::default();
        for ((column, values), woe) in table.columns().zip(mapping) {
            let encoded = values
                .iter()
                .map(|v| {
                    let score = if v.is_missing() {
                        0.0
                    } else {
                        woe.get(&v.category_label()).copied().unwrap_or(0.0)
                    };
                    Value::Number(score)
                })
                .collect();
            out.push_column(column, encoded)?;
        }
        Ok(out)
    }

    fn is_fitted(&self) -> bool {
        self.mapping.is_some()
    }

    fn feature_names(&self) -> FeatureNames {
        match &self.mapping {
            None => FeatureNames::Unfitted,
            Some(mapping) => {
                FeatureNames::Generated((0..mapping.len()).map(|i| format!("x{}", i)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupations() -> Table {
        Table::from_columns(vec![(
            "OCCUPATION_TYPE",
            vec![
                "Managers".into(),
                "Managers".into(),
                "Managers".into(),
                "Laborers".into(),
                "Laborers".into(),
                "Laborers".into(),
            ],
        )])
        .unwrap()
    }

    const TARGET: [f64; 6] = [1.0, 1.0, 0.0, 0.0, 0.0, 1.0];

    #[test]
    fn woe_matches_closed_form() {
        let mut enc = WoeEncoder::new();
        enc.fit(&occupations(), Some(&TARGET)).unwrap();
        let mapping = &enc.mapping().unwrap()[0];
        // Managers: 2 pos, 1 neg; totals 3/3; r = 1.
        let managers = ((3.0 / 5.0) / (2.0 / 5.0f64)).ln();
        assert!((mapping["Managers"] - managers).abs() < 1e-12);
        assert!((mapping["Laborers"] + managers).abs() < 1e-12);
    }

    #[test]
    fn smaller_regularization_sharpens_woe() {
        let mut enc = WoeEncoder::new().with_regularization(0.5);
        enc.fit(&occupations(), Some(&TARGET)).unwrap();
        let mapping = &enc.mapping().unwrap()[0];
        let managers = ((2.5 / 4.0) / (1.5 / 4.0f64)).ln();
        assert!((mapping["Managers"] - managers).abs() < 1e-12);
    }

    #[test]
    fn non_positive_regularization_is_rejected() {
        for r in [0.0, -1.0, f64::NAN] {
            let mut enc = WoeEncoder::new().with_regularization(r);
            assert!(matches!(
                enc.fit(&occupations(), Some(&TARGET)),
                Err(FeatureError::InvalidValue { .. })
            ));
            assert!(enc.mapping().is_none());
        }

        let mut enc: WoeEncoder = serde_json::from_str(r#"{"regularization": 0.0}"#).unwrap();
        assert!(enc.fit(&occupations(), Some(&TARGET)).is_err());
    }

    #[test]
    fn unknown_and_missing_encode_to_zero() {
        let mut enc = WoeEncoder::new();
        enc.fit(&occupations(), Some(&TARGET)).unwrap();
        let t = Table::from_columns(vec![(
            "OCCUPATION_TYPE",
            vec!["Pilots".into(), Value::Missing],
        )])
        .unwrap();
        let m = enc.transform(&t).unwrap().to_matrix().unwrap();
        assert_eq!(m.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn fit_requires_binary_target() {
        let mut enc = WoeEncoder::new();
        assert!(matches!(
            enc.fit(&occupations(), None),
            Err(FeatureError::MissingTarget(_))
        ));
        let single_class = [1.0; 6];
        assert!(enc.fit(&occupations(), Some(&single_class)).is_err());
        let non_binary = [0.0, 1.0, 2.0, 0.0, 1.0, 0.0];
        assert!(enc.fit(&occupations(), Some(&non_binary)).is_err());
    }

    #[test]
    fn names_are_one_placeholder_per_column() {
        let mut enc = WoeEncoder::new();
        assert_eq!(enc.feature_names(), FeatureNames::Unfitted);
        enc.fit(&occupations(), Some(&TARGET)).unwrap();
        assert_eq!(enc.feature_names(), FeatureNames::Generated(vec!["x0".into()]));
    }
}
