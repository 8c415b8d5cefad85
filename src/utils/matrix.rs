//! Matrix utility functions.

use faer::{Col, Mat};

/// Prepend a column of ones so that column 0 pairs with the bias weight.
pub fn add_intercept_column(x: &Mat<f64>) -> Mat<f64> {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let mut x_aug = Mat::zeros(n_rows, n_cols + 1);
    for i in 0..n_rows {
        x_aug[(i, 0)] = 1.0;
        for j in 0..n_cols {
            x_aug[(i, j + 1)] = x[(i, j)];
        }
    }
    x_aug
}

/// Linear predictor η = X·w.
pub fn linear_predictor(x: &Mat<f64>, w: &Col<f64>) -> Col<f64> {
    let n_cols = x.ncols();
    Col::from_fn(x.nrows(), |i| {
        let mut eta = 0.0;
        for j in 0..n_cols {
            eta += x[(i, j)] * w[j];
        }
        eta
    })
}

/// Xᵗ·r for a residual-like vector r of length `x.nrows()`.
pub fn transpose_times(x: &Mat<f64>, r: &Col<f64>) -> Col<f64> {
    let n_rows = x.nrows();
    Col::from_fn(x.ncols(), |j| {
        let mut sum = 0.0;
        for i in 0..n_rows {
            sum += x[(i, j)] * r[i];
        }
        sum
    })
}

/// Squared L2 norm of `w[1..]`, skipping the bias at index 0.
pub fn squared_norm_without_bias(w: &Col<f64>) -> f64 {
    (1..w.nrows()).map(|j| w[j] * w[j]).sum()
}

/// Inner product of two equal-length vectors.
pub fn dot(a: &Col<f64>, b: &Col<f64>) -> f64 {
    (0..a.nrows()).map(|i| a[i] * b[i]).sum()
}

/// Largest absolute entry (0 for an empty vector).
pub fn inf_norm(v: &Col<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

/// Copy a column vector into a `Vec`.
pub fn to_vec(v: &Col<f64>) -> Vec<f64> {
    (0..v.nrows()).map(|i| v[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_intercept_column() {
        let x = Mat::from_fn(3, 2, |i, j| (i * 2 + j) as f64);
        let x_aug = add_intercept_column(&x);

        assert_eq!(x_aug.nrows(), 3);
        assert_eq!(x_aug.ncols(), 3);
        for i in 0..3 {
            assert_eq!(x_aug[(i, 0)], 1.0);
            assert_eq!(x_aug[(i, 1)], x[(i, 0)]);
            assert_eq!(x_aug[(i, 2)], x[(i, 1)]);
        }
    }

    #[test]
    fn test_linear_predictor() {
        // [[1, 2], [1, 3]] · [0.5, 2] = [4.5, 6.5]
        let x = Mat::from_fn(2, 2, |i, j| if j == 0 { 1.0 } else { (i + 2) as f64 });
        let w = Col::from_fn(2, |j| if j == 0 { 0.5 } else { 2.0 });
        let eta = linear_predictor(&x, &w);

        assert!((eta[0] - 4.5).abs() < 1e-12);
        assert!((eta[1] - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_transpose_times() {
        let x = Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let r = Col::from_fn(3, |i| (i + 1) as f64);
        let g = transpose_times(&x, &r);

        // column 0: 1 + 2 + 3, column 1: 0*1 + 1*2 + 2*3
        assert!((g[0] - 6.0).abs() < 1e-12);
        assert!((g[1] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_squared_norm_without_bias() {
        let w = Col::from_fn(3, |j| (j + 1) as f64); // [1, 2, 3]
        assert!((squared_norm_without_bias(&w) - 13.0).abs() < 1e-12);

        let bias_only = Col::from_fn(1, |_| 10.0);
        assert_eq!(squared_norm_without_bias(&bias_only), 0.0);
    }

    #[test]
    fn test_norms() {
        let v = Col::from_fn(3, |i| [1.0, -4.0, 2.0][i]);
        assert_eq!(inf_norm(&v), 4.0);
        assert_eq!(dot(&v, &v), 21.0);
        assert_eq!(to_vec(&v), vec![1.0, -4.0, 2.0]);
        assert_eq!(inf_norm(&Col::<f64>::zeros(0)), 0.0);
    }
}
