//! # Ridge Poisson Regression
//!
//! Fits count data with a log-linear Poisson model and an optional ridge
//! penalty on the non-bias weights.
//!
//! ## When to Use
//! - Count data (non-negative integers)
//! - Many or correlated features, where shrinkage stabilizes the fit
//!
//! Run with: `cargo run --example poisson_counts`

use faer::{Col, Mat};
use ridge_glm::prelude::*;

fn main() -> Result<(), RegressionError> {
    println!("=== Ridge Poisson Regression ===\n");

    small_scenario()?;
    regularization_path()?;
    optimizer_comparison()?;

    Ok(())
}

/// Five observations, one feature.
fn small_scenario() -> Result<(), RegressionError> {
    println!("--- Small Scenario ---\n");

    let x = add_intercept_column(&Mat::from_fn(5, 1, |i, _| i as f64));
    let y = Col::from_fn(5, |i| [0.0, 1.0, 2.0, 1.0, 3.0][i]);

    let fitted = PoissonRegression::new().fit(&x, &y)?;
    let counts = fitted.predict(&x)?;
    let means = fitted.predict_mean(&x)?;

    println!("Intercept: {:.4}", fitted.intercept().unwrap_or(f64::NAN));
    println!("Slope:     {:.4}\n", fitted.coefficients().map_or(f64::NAN, |c| c[0]));
    println!("  x    y    mean    count");
    for i in 0..5 {
        println!("{:>3} {:>4} {:>7.3} {:>8}", i, y[i], means[i], counts[i]);
    }
    println!("\n{}\n", fitted.summarize(&x, &y)?);

    Ok(())
}

/// Coefficients shrink as lambda grows; the bias does not.
fn regularization_path() -> Result<(), RegressionError> {
    println!("--- Regularization Path ---\n");

    let n = 200;
    let features = Mat::from_fn(n, 2, |i, j| {
        let t = i as f64 / n as f64;
        if j == 0 {
            2.0 * t - 1.0
        } else {
            (7.0 * t).sin()
        }
    });
    let y = Col::from_fn(n, |i| {
        let eta = 1.0 + 0.8 * features[(i, 0)] - 0.5 * features[(i, 1)];
        let wiggle = ((i as f64) * 1.3).sin() * 0.4;
        (eta.exp() + wiggle).round().max(0.0)
    });
    let x = add_intercept_column(&features);

    println!("  lambda   intercept      b1       b2");
    for lambda in [0.0, 0.01, 0.1, 1.0, 10.0] {
        let fitted = PoissonRegression::with_lambda(lambda)?.fit(&x, &y)?;
        let w = fitted.weights().ok_or(RegressionError::NotFitted)?;
        println!("{:>8} {:>10.4} {:>8.4} {:>8.4}", lambda, w[0], w[1], w[2]);
    }
    println!();

    Ok(())
}

/// L-BFGS and gradient descent reach the same optimum.
fn optimizer_comparison() -> Result<(), RegressionError> {
    println!("--- Optimizer Comparison ---\n");

    let x = add_intercept_column(&Mat::from_fn(5, 1, |i, _| i as f64));
    let y = Col::from_fn(5, |i| [0.0, 1.0, 2.0, 1.0, 3.0][i]);
    let model = PoissonRegression::with_lambda(0.1)?;

    let lbfgs = Lbfgs::default();
    let gd = GradientDescent::new(OptimizerOptions::builder().max_iterations(20_000).build()?)?;

    let (_, lbfgs_trace) = model.fit_with(&x, &y, &lbfgs)?;
    let (_, gd_trace) = model.fit_with(&x, &y, &gd)?;

    println!("L-BFGS:           {lbfgs_trace}");
    println!("Gradient descent: {gd_trace}");

    Ok(())
}
