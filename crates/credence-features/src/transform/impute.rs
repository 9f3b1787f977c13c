use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::table::{Table, Value};
use crate::transform::{check_not_empty, check_width, quantile, sorted, ColumnTransform, FeatureNames};

/// How missing cells are filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
    Constant(Value),
}

/// Replaces missing cells with a per-column statistic learned at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputer {
    pub strategy: ImputeStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fill_values: Option<Vec<Value>>,
}

impl SimpleImputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: None,
        }
    }

    /// Learned fill values, one per input column.
    pub fn fill_values(&self) -> Option<&[Value]> {
        self.fill_values.as_deref()
    }

    fn fill_value(&self, column: &str, values: &[Value]) -> Result<Value> {
        match &self.strategy {
            ImputeStrategy::Constant(value) => Ok(value.clone()),
            ImputeStrategy::Mean | ImputeStrategy::Median => {
                let numbers = observed(column, values)?
                    .into_iter()
                    .map(|v| {
                        v.as_f64().ok_or_else(|| FeatureError::InvalidValue {
                            column: column.to_string(),
                            reason: format!("cannot average non-numeric value '{}'", v),
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                let stat = if self.strategy == ImputeStrategy::Mean {
                    numbers.iter().sum::<f64>() / numbers.len() as f64
                } else {
                    quantile(&sorted(numbers), 0.5)
                };
                Ok(Value::Number(stat))
            }
            ImputeStrategy::MostFrequent => {
                // Ties resolve to the smallest label.
                let mut counts: BTreeMap<String, (usize, &Value)> = BTreeMap::new();
                for v in observed(column, values)? {
                    counts.entry(v.category_label()).or_insert((0, v)).0 += 1;
                }
                let mut best: Option<(usize, &Value)> = None;
                for (count, value) in counts.values() {
                    if best.map_or(true, |(c, _)| *count > c) {
                        best = Some((*count, *value));
                    }
                }
                Ok(best.map(|(_, v)| v.clone()).unwrap_or(Value::Missing))
            }
        }
    }
}

fn observed<'a>(column: &str, values: &'a [Value]) -> Result<Vec<&'a Value>> {
    let observed: Vec<&Value> = values.iter().filter(|v| !v.is_missing()).collect();
    if observed.is_empty() {
        return Err(FeatureError::InvalidValue {
            column: column.to_string(),
            reason: "no observed values to learn a fill value from".to_string(),
        });
    }
    Ok(observed)
}

impl ColumnTransform for SimpleImputer {
    fn name(&self) -> &'static str {
        "SimpleImputer"
    }

    fn fit(&mut self, table: &Table, _target: Option<&[f64]>) -> Result<()> {
        check_not_empty(self.name(), table)?;
        let fill_values = table
            .columns()
            .map(|(name, values)| self.fill_value(name, values))
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "SimpleImputer({:?}) learned fill values {:?}",
            self.strategy,
            fill_values
        );
        self.fill_values = Some(fill_values);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table> {
        let fill_values = self
            .fill_values
            .as_ref()
            .ok_or_else(|| FeatureError::NotFitted(self.name().to_string()))?;
        check_width(self.name(), fill_values.len(), table)?;

        let mut out = Table::default();
        for ((name, values), fill) in table.columns().zip(fill_values) {
            let filled = values
                .iter()
                .map(|v| if v.is_missing() { fill.clone() } else { v.clone() })
                .collect();
            out.push_column(name, filled)?;
        }
        Ok(out)
    }

    fn is_fitted(&self) -> bool {
        self.fill_values.is_some()
    }

    fn feature_names(&self) -> FeatureNames {
        FeatureNames::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns(vec![
            (
                "income",
                vec![1.0.into(), Value::Missing, 3.0.into(), 10.0.into()],
            ),
            (
                "occupation",
                vec!["Laborers".into(), "Drivers".into(), Value::Missing, "Drivers".into()],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn median_fills_numeric_gaps() {
        let mut imp = SimpleImputer::new(ImputeStrategy::Median);
        imp.fit(&table().select(&["income"]).unwrap(), None).unwrap();
        let out = imp.transform(&table().select(&["income"]).unwrap()).unwrap();
        assert_eq!(out.column("income").unwrap()[1], Value::Number(3.0));
    }

    #[test]
    fn mean_rejects_text_columns() {
        let mut imp = SimpleImputer::new(ImputeStrategy::Mean);
        assert!(matches!(
            imp.fit(&table(), None),
            Err(FeatureError::InvalidValue { .. })
        ));
    }

    #[test]
    fn most_frequent_handles_categories() {
        let mut imp = SimpleImputer::new(ImputeStrategy::MostFrequent);
        imp.fit(&table(), None).unwrap();
        let out = imp.transform(&table()).unwrap();
        assert_eq!(out.column("occupation").unwrap()[2], Value::from("Drivers"));
        assert_eq!(imp.fill_values().unwrap().len(), 2);
    }

    #[test]
    fn constant_fill_works_on_all_missing_column() {
        let t = Table::from_columns(vec![("x", vec![Value::Missing, Value::Missing])]).unwrap();
        let mut imp = SimpleImputer::new(ImputeStrategy::Constant("unknown".into()));
        imp.fit(&t, None).unwrap();
        let out = imp.transform(&t).unwrap();
        assert!(out.column("x").unwrap().iter().all(|v| *v == Value::from("unknown")));
    }

    #[test]
    fn transform_before_fit_fails() {
        let imp = SimpleImputer::new(ImputeStrategy::Mean);
        assert!(matches!(
            imp.transform(&table()),
            Err(FeatureError::NotFitted(_))
        ));
    }
}
