use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{FeatureError, Result};
use crate::table::Table;

/// Split the target column off a training table.
///
/// Returns the remaining features and the labels as 0.0 / 1.0.
pub fn split_target(table: &Table, target: &str) -> Result<(Table, Vec<f64>)> {
    let y = table.numeric_column(target)?;
    if let Some((row, bad)) = y.iter().enumerate().find(|(_, v)| **v != 0.0 && **v != 1.0) {
        return Err(FeatureError::InvalidValue {
            column: target.to_string(),
            reason: format!("expected a 0/1 label at row {}, got {}", row, bad),
        });
    }
    Ok((table.without(target), y))
}

/// Shuffle rows with a seeded RNG and hold out `fraction` of them.
///
/// Returns `(train, validation)`; with `fraction == 0.0` the validation
/// table is empty and the training table keeps the original row order.
pub fn train_validation_split(table: &Table, fraction: f64, seed: u64) -> (Table, Table) {
    let n_samples = table.nrows();
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let n_validation = (n_samples as f64 * fraction).round() as usize;
    if n_validation == 0 {
        return (table.clone(), table.select_rows(&[]));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let (validation, train) = indices.split_at(n_validation.min(n_samples));
    let mut train = train.to_vec();
    let mut validation = validation.to_vec();
    train.sort_unstable();
    validation.sort_unstable();
    (table.select_rows(&train), table.select_rows(&validation))
}

/// Fraction of correct 0/1 predictions.
pub fn accuracy(predicted: &[u8], y: &[f64]) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(y)
        .filter(|(p, t)| f64::from(**p) == **t)
        .count();
    correct as f64 / y.len() as f64
}
