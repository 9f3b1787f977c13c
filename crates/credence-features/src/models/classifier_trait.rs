use crate::error::Result;
use crate::math::Array2;

/// Contract for binary classifiers scored on transformed feature matrices.
pub trait ClassifierModel {
    /// Fit the model. `y` uses the crate convention (1.0 positive, 0.0 negative).
    fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()>;

    /// Probability of the positive class, one value per row of `x`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>>;

    /// Hard 0/1 labels using `threshold` on the positive-class probability.
    fn predict(&self, x: &Array2<f64>, threshold: f64) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p >= threshold))
            .collect())
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
