//! Common test utilities and data generators.

#![allow(dead_code)]

use faer::{Col, Mat};
use ridge_glm::prelude::*;

/// The five-row scenario: x = 0..4 with a bias column, y = [0, 1, 2, 1, 3].
pub fn scenario_data() -> (Mat<f64>, Col<f64>) {
    let x = add_intercept_column(&Mat::from_fn(5, 1, |i, _| i as f64));
    let y = Col::from_fn(5, |i| [0.0, 1.0, 2.0, 1.0, 3.0][i]);
    (x, y)
}

/// Generate count data with log-mean `intercept + Σ slope_j * x_j`.
///
/// Features lie in [-1, 1]; counts are the mean rounded after a bounded
/// multiplicative perturbation. Returns the design matrix with a bias column.
pub fn generate_count_data(
    n_samples: usize,
    intercept: f64,
    slopes: &[f64],
    seed: u64,
) -> (Mat<f64>, Col<f64>) {
    // Simple deterministic "random" for reproducibility
    let mut rng_state = seed;
    let mut next_rand = || -> f64 {
        rng_state = rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((rng_state >> 33) as f64) / ((1u64 << 30) as f64) - 1.0
    };

    let n_features = slopes.len();
    let mut features = Mat::zeros(n_samples, n_features);
    let mut y = Col::zeros(n_samples);

    for i in 0..n_samples {
        let mut eta = intercept;
        for j in 0..n_features {
            features[(i, j)] = next_rand();
            eta += slopes[j] * features[(i, j)];
        }
        let noise = 1.0 + 0.3 * next_rand();
        y[i] = (eta.exp() * noise).round().max(0.0);
    }

    (add_intercept_column(&features), y)
}

/// Central finite-difference gradient of the model's loss.
pub fn numerical_gradient<M: RegressionModel>(
    model: &M,
    w: &Col<f64>,
    x: &Mat<f64>,
    y: &Col<f64>,
    h: f64,
) -> Col<f64> {
    Col::from_fn(w.nrows(), |j| {
        let mut plus = w.clone();
        let mut minus = w.clone();
        plus[j] += h;
        minus[j] -= h;
        let f_plus = model.loss_stateless(&plus, x, y).unwrap();
        let f_minus = model.loss_stateless(&minus, x, y).unwrap();
        (f_plus - f_minus) / (2.0 * h)
    })
}

/// Build a column vector from a slice.
pub fn col(values: &[f64]) -> Col<f64> {
    Col::from_fn(values.len(), |i| values[i])
}
