use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};
use crate::math::Array2;
use crate::models::classifier_trait::ClassifierModel;

/// L2-regularized logistic regression fitted with full-batch gradient descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub l2_penalty: f64,
    /// Stop once the largest absolute gradient component falls below this.
    pub tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weights: Option<Vec<f64>>,
    #[serde(default)]
    intercept: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.1, 500, 1e-4, 1e-6)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, max_iter: usize, l2_penalty: f64, tolerance: f64) -> Self {
        LogisticRegression {
            learning_rate,
            max_iter,
            l2_penalty,
            tolerance,
            weights: None,
            intercept: 0.0,
        }
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    fn linear(&self, weights: &[f64], row: &[f64]) -> f64 {
        row.iter().zip(weights).map(|(x, w)| x * w).sum::<f64>() + self.intercept
    }

    fn log_loss(&self, weights: &[f64], x: &Array2<f64>, y: &[f64]) -> f64 {
        let eps = 1e-12;
        let n = x.nrows() as f64;
        (0..x.nrows())
            .map(|row| {
                let p = sigmoid(self.linear(weights, x.row_slice(row))).clamp(eps, 1.0 - eps);
                -(y[row] * p.ln() + (1.0 - y[row]) * (1.0 - p).ln())
            })
            .sum::<f64>()
            / n
    }
}

impl ClassifierModel for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        if x.nrows() == 0 {
            return Err(FeatureError::EmptyData(
                "cannot fit LogisticRegression without rows".to_string(),
            ));
        }
        if y.len() != x.nrows() {
            return Err(FeatureError::ShapeMismatch {
                expected: format!("{} labels", x.nrows()),
                got: format!("{} labels", y.len()),
            });
        }
        if let Some(bad) = y.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(FeatureError::InvalidValue {
                column: "target".to_string(),
                reason: format!("expected 0/1 labels, got {}", bad),
            });
        }

        let n = x.nrows() as f64;
        let mut weights = vec![0.0; x.ncols()];
        self.intercept = 0.0;

        let mut iterations = 0;
        for _ in 0..self.max_iter {
            iterations += 1;
            let mut grad_w = vec![0.0; x.ncols()];
            let mut grad_b = 0.0;
            for row in 0..x.nrows() {
                let features = x.row_slice(row);
                let residual = sigmoid(self.linear(&weights, features)) - y[row];
                for (g, v) in grad_w.iter_mut().zip(features) {
                    *g += residual * v;
                }
                grad_b += residual;
            }
            let mut max_grad = (grad_b / n).abs();
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g = *g / n + self.l2_penalty * w;
                max_grad = max_grad.max(g.abs());
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * g;
            }
            self.intercept -= self.learning_rate * grad_b / n;
            if max_grad < self.tolerance {
                break;
            }
        }

        log::debug!(
            "LogisticRegression converged after {} iterations, log-loss {:.5}",
            iterations,
            self.log_loss(&weights, x, y)
        );
        self.weights = Some(weights);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| FeatureError::NotFitted(self.name().to_string()))?;
        if x.ncols() != weights.len() {
            return Err(FeatureError::ShapeMismatch {
                expected: format!("{} features", weights.len()),
                got: format!("{} features", x.ncols()),
            });
        }
        Ok((0..x.nrows())
            .map(|row| sigmoid(self.linear(weights, x.row_slice(row))))
            .collect())
    }

    fn name(&self) -> &str {
        "LogisticRegression"
    }
}
