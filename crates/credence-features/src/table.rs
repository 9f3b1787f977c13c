//! In-memory tabular data with named columns.
//!
//! `Table` is the exchange format between callers (CSV loader, HTTP layer)
//! and the column transformers. Cells are loosely typed `Value`s so that raw
//! categorical codes and numbers can live side by side until an encoder turns
//! them into numbers.
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{FeatureError, Result};
use crate::math::Array2;

/// A single cell.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawValue")]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Null => Value::Missing,
            RawValue::Bool(b) => Value::Number(if b { 1.0 } else { 0.0 }),
            RawValue::Number(n) => Value::Number(n),
            RawValue::Text(s) => Value::Text(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

impl Value {
    /// Parse a raw text cell: empty means missing, numbers become `Number`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Label used when the value is treated as a category.
    pub fn category_label(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) if n.is_nan() => "missing".to_string(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
            Value::Missing => "missing".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, ""),
            other => write!(f, "{}", other.category_label()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// One observation keyed by feature name.
pub type Record = BTreeMap<String, Value>;

/// Column-major table of `Value`s.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
    nrows: usize,
}

impl Table {
    /// Build a table from `(name, values)` pairs; all columns must share a length.
    pub fn from_columns<N: Into<String>>(columns: Vec<(N, Vec<Value>)>) -> Result<Self> {
        let mut table = Table::default();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Build a table from records. Columns are the sorted union of record
    /// keys; keys absent from a record become `Missing`.
    pub fn from_records(records: &[Record]) -> Self {
        let keys: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();
        let names: Vec<String> = keys.into_iter().cloned().collect();
        let columns = names
            .iter()
            .map(|name| {
                records
                    .iter()
                    .map(|r| r.get(name).cloned().unwrap_or(Value::Missing))
                    .collect()
            })
            .collect();
        Table {
            names,
            columns,
            nrows: records.len(),
        }
    }

    pub fn push_column<N: Into<String>>(&mut self, name: N, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.names.is_empty() && self.columns.is_empty() {
            self.nrows = values.len();
        }
        if values.len() != self.nrows {
            return Err(FeatureError::ShapeMismatch {
                expected: format!("{} rows in column '{}'", self.nrows, name),
                got: format!("{} rows", values.len()),
            });
        }
        if self.names.contains(&name) {
            return Err(FeatureError::InvalidConfig(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.position(name).map(|idx| self.columns[idx].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(n, c)| (n.as_str(), c.as_slice()))
    }

    /// Return the named columns in the requested order.
    ///
    /// Every absent column is reported at once; nothing is silently dropped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let requested: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        let missing: Vec<String> = requested
            .iter()
            .filter(|n| self.position(n).is_none())
            .map(|n| n.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FeatureError::MissingColumns { missing });
        }

        let mut seen = HashSet::new();
        let mut out = Table {
            nrows: self.nrows,
            ..Table::default()
        };
        for name in requested {
            if !seen.insert(name) {
                continue;
            }
            if let Some(values) = self.column(name) {
                out.names.push(name.to_string());
                out.columns.push(values.to_vec());
            }
        }
        Ok(out)
    }

    /// Copy of the table without `name` (no-op when absent).
    pub fn without(&self, name: &str) -> Table {
        let mut out = self.clone();
        if let Some(idx) = out.position(name) {
            out.names.remove(idx);
            out.columns.remove(idx);
        }
        out
    }

    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| indices.iter().map(|&i| c[i].clone()).collect())
                .collect(),
            nrows: indices.len(),
        }
    }

    /// Numeric view of one column. Missing or text cells are errors.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let values = self.column(name).ok_or_else(|| FeatureError::MissingColumns {
            missing: vec![name.to_string()],
        })?;
        values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.as_f64().ok_or_else(|| FeatureError::InvalidValue {
                    column: name.to_string(),
                    reason: format!("expected a number at row {}, got '{}'", row, v),
                })
            })
            .collect()
    }

    /// Convert an all-numeric table into a row-major matrix.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        let columns = self
            .names
            .iter()
            .map(|name| self.numeric_column(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Array2::from_columns(self.nrows, &columns)?)
    }
}
