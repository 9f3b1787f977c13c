//! Column transformer that keeps track of output feature names.
//!
//! A [`NamedColumnTransformer`] applies a list of [`TransformStep`]s, each to
//! its own declared columns, and concatenates the results column-wise in
//! declaration order. After fitting it always knows the name of every output
//! column, including the ones an encoder expands a single input into.
//!
//! # Example
//! ```
//! use credence_features::column_transformer::{FeatureSets, NamedColumnTransformer, TransformStep};
//! use credence_features::table::{Table, Value};
//! use credence_features::transform::{OneHotEncoder, StandardScaler};
//!
//! let table = Table::from_columns(vec![
//!     ("income", vec![Value::from(10.0), Value::from(20.0)]),
//!     ("gender", vec![Value::from("F"), Value::from("M")]),
//! ])
//! .unwrap();
//!
//! let mut ct = NamedColumnTransformer::new(
//!     vec![
//!         TransformStep::new("num", StandardScaler::new(), &["income"]),
//!         TransformStep::new("cat", OneHotEncoder::new(), &["gender"]),
//!     ],
//!     FeatureSets::new(&["income"], &["gender"], &[]),
//!     true,
//! );
//! let x = ct.fit_transform(&table, None).unwrap();
//! assert_eq!(ct.final_features(), &["income", "gender_F", "gender_M"]);
//! assert_eq!(x.ncols(), 3);
//! ```
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::math::Array2;
use crate::naming::substitute_all;
use crate::table::Table;
use crate::transform::{ColumnTransform, FeatureNames, Transformer};

/// A transformer bound to the ordered columns it consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStep {
    pub name: String,
    pub transformer: Transformer,
    pub columns: Vec<String>,
}

impl TransformStep {
    pub fn new<N, T, S>(name: N, transformer: T, columns: &[S]) -> Self
    where
        N: Into<String>,
        T: Into<Transformer>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            transformer: transformer.into(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    /// Output names of this step, falling back to the declared columns when
    /// the producing transformer does not generate names.
    pub fn output_names(&self) -> Result<Vec<String>> {
        match self.transformer.final_stage().feature_names() {
            FeatureNames::Generated(names) => Ok(substitute_all(&names, &self.columns)),
            FeatureNames::Unsupported => Ok(self.columns.clone()),
            FeatureNames::Unfitted => Err(FeatureError::NotFitted(format!(
                "step '{}' ({})",
                self.name,
                self.transformer.final_stage().name()
            ))),
        }
    }
}

/// Declared feature partition. Only used to enforce the input schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSets {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub special: Vec<String>,
}

impl FeatureSets {
    pub fn new<S: AsRef<str>>(numeric: &[S], categorical: &[S], special: &[S]) -> Self {
        let owned = |v: &[S]| v.iter().map(|s| s.as_ref().to_string()).collect();
        Self {
            numeric: owned(numeric),
            categorical: owned(categorical),
            special: owned(special),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty() && self.special.is_empty()
    }

    /// numeric ++ categorical ++ special
    pub fn concat(&self) -> Vec<String> {
        self.numeric
            .iter()
            .chain(&self.categorical)
            .chain(&self.special)
            .cloned()
            .collect()
    }
}

/// State produced by a successful fit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FittedState {
    pub initial_features: Vec<String>,
    pub final_features: Vec<String>,
    pub fitted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColumnTransformer {
    steps: Vec<TransformStep>,
    features: FeatureSets,
    hard_mode: bool,
    state: FittedState,
}

impl NamedColumnTransformer {
    pub fn new(steps: Vec<TransformStep>, features: FeatureSets, hard_mode: bool) -> Self {
        if features.is_empty() {
            log::warn!(
                "No initial features were set; declare numeric, categorical and/or special \
                 features explicitly to avoid unexpected behavior when using the transformer."
            );
        }
        log::info!(
            "Hard mode for the NamedColumnTransformer set to {}: the initial features {} going \
             to be enforced during fit and transform",
            hard_mode,
            if hard_mode { "are" } else { "are not" }
        );
        let state = FittedState {
            initial_features: features.concat(),
            ..FittedState::default()
        };
        Self {
            steps,
            features,
            hard_mode,
            state,
        }
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    pub fn features(&self) -> &FeatureSets {
        &self.features
    }

    pub fn hard_mode(&self) -> bool {
        self.hard_mode
    }

    pub fn is_fitted(&self) -> bool {
        self.state.fitted
    }

    pub fn initial_features(&self) -> &[String] {
        &self.state.initial_features
    }

    /// Names of the columns produced by `transform`; empty before fitting.
    pub fn final_features(&self) -> &[String] {
        &self.state.final_features
    }

    /// Fit every step. On failure the previous state is left untouched.
    pub fn fit(&mut self, table: &Table, target: Option<&[f64]>) -> Result<()> {
        let input = self.fit_input(table)?;
        let (steps, state) = self.fit_steps(&input, table, target)?;
        self.commit(steps, state);
        Ok(())
    }

    /// Fit, then transform exactly the table the steps were fitted on.
    pub fn fit_transform(&mut self, table: &Table, target: Option<&[f64]>) -> Result<Array2<f64>> {
        let input = self.fit_input(table)?;
        let (steps, state) = self.fit_steps(&input, table, target)?;
        let x = apply_steps(&steps, &input, state.final_features.len())?;
        self.commit(steps, state);
        Ok(x)
    }

    /// Apply the fitted steps. Under hard mode the input must contain every
    /// initial feature; extra columns are ignored.
    pub fn transform(&self, table: &Table) -> Result<Array2<f64>> {
        if !self.state.fitted {
            return Err(FeatureError::NotFitted("NamedColumnTransformer".to_string()));
        }
        let input: Cow<Table> = if self.hard_mode {
            Cow::Owned(table.select(&self.state.initial_features)?)
        } else {
            Cow::Borrowed(table)
        };
        apply_steps(&self.steps, &input, self.state.final_features.len())
    }

    /// Output names of all steps, in declaration order.
    pub fn get_all_column_names(steps: &[TransformStep]) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for step in steps {
            names.extend(step.output_names()?);
        }
        Ok(names)
    }

    fn fit_input<'a>(&self, table: &'a Table) -> Result<Cow<'a, Table>> {
        if self.hard_mode {
            Ok(Cow::Owned(table.select(&self.state.initial_features)?))
        } else {
            Ok(Cow::Borrowed(table))
        }
    }

    fn fit_steps(
        &self,
        input: &Table,
        original: &Table,
        target: Option<&[f64]>,
    ) -> Result<(Vec<TransformStep>, FittedState)> {
        if input.nrows() == 0 {
            return Err(FeatureError::EmptyData(
                "cannot fit NamedColumnTransformer on an empty table".to_string(),
            ));
        }
        if let Some(y) = target {
            if y.len() != input.nrows() {
                return Err(FeatureError::ShapeMismatch {
                    expected: format!("{} target values", input.nrows()),
                    got: format!("{} target values", y.len()),
                });
            }
        }

        let mut steps = self.steps.clone();
        for step in steps.iter_mut() {
            let sub = input.select(&step.columns)?;
            step.transformer.fit(&sub, target)?;
            log::debug!(
                "fitted step '{}' ({}) on {} columns",
                step.name,
                step.transformer.name(),
                step.columns.len()
            );
        }

        let mut final_features = Vec::new();
        for step in &steps {
            let names = step.output_names()?;
            let width = step.transformer.output_width(step.columns.len());
            if names.len() != width {
                return Err(FeatureError::ShapeMismatch {
                    expected: format!("{} names for step '{}'", width, step.name),
                    got: format!("{} names", names.len()),
                });
            }
            final_features.extend(names);
        }

        let initial_features = if self.hard_mode {
            self.state.initial_features.clone()
        } else {
            original.column_names().to_vec()
        };
        log::info!(
            "NamedColumnTransformer fitted: {} input features -> {} output features",
            initial_features.len(),
            final_features.len()
        );

        Ok((
            steps,
            FittedState {
                initial_features,
                final_features,
                fitted: true,
            },
        ))
    }

    fn commit(&mut self, steps: Vec<TransformStep>, state: FittedState) {
        self.steps = steps;
        self.state = state;
    }
}

fn apply_steps(steps: &[TransformStep], input: &Table, expected_cols: usize) -> Result<Array2<f64>> {
    let blocks = steps
        .iter()
        .map(|step| {
            let sub = input.select(&step.columns)?;
            step.transformer.transform(&sub)?.to_matrix()
        })
        .collect::<Result<Vec<_>>>()?;
    let x = Array2::hstack(input.nrows(), &blocks)?;
    if x.ncols() != expected_cols {
        return Err(FeatureError::ShapeMismatch {
            expected: format!("{} output columns", expected_cols),
            got: format!("{} columns", x.ncols()),
        });
    }
    Ok(x)
}
