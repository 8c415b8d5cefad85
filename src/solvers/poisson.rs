//! Ridge-regularized Poisson regression.
//!
//! Fits a log-linear model for count data by minimizing the sample-averaged
//! negative Poisson log-likelihood plus an L2 penalty on the non-bias weights:
//!
//! ```text
//! loss(w) = -mean(y·log(μ) - μ) + ½·λ·‖w[1..]‖²,   μ = exp(X·w)
//! ```
//!
//! # Example
//!
//! ```rust
//! use ridge_glm::prelude::*;
//! use faer::{Col, Mat};
//!
//! let x = add_intercept_column(&Mat::from_fn(20, 1, |i, _| i as f64 / 10.0));
//! let y = Col::from_fn(20, |i| (i / 5) as f64);
//!
//! let fitted = PoissonRegression::with_lambda(0.1)?.fit(&x, &y)?;
//!
//! let counts = fitted.predict(&x)?;
//! let means = fitted.predict_mean(&x)?;
//! assert!(counts[19] <= means[19]);
//! # Ok::<(), RegressionError>(())
//! ```

use crate::core::{validate_lambda, FitSummary, GlmFamily, PoissonFamily};
use crate::solvers::traits::{
    check_observations, check_weights, LossEvaluation, RegressionError, RegressionModel,
};
use crate::utils::matrix::{linear_predictor, squared_norm_without_bias, to_vec, transpose_times};
use faer::{Col, Mat};

/// Poisson regression with log link and ridge penalty.
///
/// The model is an immutable value: fitting returns a new model carrying the
/// weights and leaves the original untouched.
#[derive(Debug, Clone)]
pub struct PoissonRegression {
    lambda: f64,
    weights: Option<Col<f64>>,
    family: PoissonFamily,
}

/// Predicted Poisson means μ = exp(X·w) for one weight vector.
///
/// Computed once by [`PoissonRegression::predict_mean_stateless`] and passed
/// to [`PoissonRegression::loss_from_mean`] and
/// [`PoissonRegression::gradient_from_mean`], so a loss/gradient pair at the
/// same weights needs a single exponentiation pass.
#[derive(Debug, Clone)]
pub struct PredictedMean(Col<f64>);

impl PredictedMean {
    /// The means as a column vector.
    pub fn as_col(&self) -> &Col<f64> {
        &self.0
    }

    /// Consume into the underlying column vector.
    pub fn into_inner(self) -> Col<f64> {
        self.0
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }
}

impl Default for PoissonRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl PoissonRegression {
    /// Unregularized model (λ = 0), unfitted.
    pub fn new() -> Self {
        Self {
            lambda: 0.0,
            weights: None,
            family: PoissonFamily,
        }
    }

    /// Model with ridge strength `lambda`, unfitted.
    ///
    /// Fails with [`RegressionError::InvalidOptions`] when `lambda` is
    /// negative or not finite.
    pub fn with_lambda(lambda: f64) -> Result<Self, RegressionError> {
        validate_lambda(lambda)?;
        Ok(Self {
            lambda,
            ..Self::new()
        })
    }

    /// Ridge strength.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Bias weight, if fitted.
    pub fn intercept(&self) -> Option<f64> {
        self.weights.as_ref().and_then(|w| (w.nrows() > 0).then(|| w[0]))
    }

    /// Weights excluding the bias, if fitted.
    pub fn coefficients(&self) -> Option<Col<f64>> {
        self.weights
            .as_ref()
            .map(|w| Col::from_fn(w.nrows().saturating_sub(1), |j| w[j + 1]))
    }

    /// μ = exp(X·w) at arbitrary weights.
    pub fn predict_mean_stateless(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
    ) -> Result<PredictedMean, RegressionError> {
        check_weights(w, x)?;
        let eta = linear_predictor(x, w);
        Ok(PredictedMean(Col::from_fn(eta.nrows(), |i| {
            self.family.mean(eta[i])
        })))
    }

    /// μ = exp(X·w) with the stored weights.
    pub fn predict_mean(&self, x: &Mat<f64>) -> Result<Col<f64>, RegressionError> {
        let w = self.weights.as_ref().ok_or(RegressionError::NotFitted)?;
        Ok(self.predict_mean_stateless(w, x)?.into_inner())
    }

    /// Ridge penalty ½·λ·‖w[1..]‖².
    pub fn penalty(&self, w: &Col<f64>) -> f64 {
        0.5 * self.lambda * squared_norm_without_bias(w)
    }

    /// Regularized loss from precomputed means.
    pub fn loss_from_mean(
        &self,
        w: &Col<f64>,
        mean: &PredictedMean,
        y: &Col<f64>,
    ) -> Result<f64, RegressionError> {
        check_mean(mean, y)?;
        let n = y.nrows() as f64;
        let mu = mean.as_col();

        let kernel: f64 = (0..y.nrows())
            .map(|i| self.family.kernel(y[i], mu[i]))
            .sum();

        Ok(-kernel / n + self.penalty(w))
    }

    /// Loss gradient from precomputed means: Xᵗ(μ - y)/n + λ·w, bias excluded
    /// from the ridge term.
    pub fn gradient_from_mean(
        &self,
        w: &Col<f64>,
        mean: &PredictedMean,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<Col<f64>, RegressionError> {
        check_weights(w, x)?;
        check_observations(x, y)?;
        check_mean(mean, y)?;
        let n = y.nrows() as f64;
        let mu = mean.as_col();

        let residual = Col::from_fn(y.nrows(), |i| mu[i] - y[i]);
        let mut grad = transpose_times(x, &residual);
        for j in 0..grad.nrows() {
            grad[j] /= n;
            if j > 0 {
                grad[j] += self.lambda * w[j];
            }
        }

        Ok(grad)
    }

    /// Goodness-of-fit statistics of the fitted model on `(x, y)`.
    pub fn summarize(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<FitSummary, RegressionError> {
        let w = self.weights.as_ref().ok_or(RegressionError::NotFitted)?;
        check_observations(x, y)?;
        self.validate_target(y)?;

        let mean = self.predict_mean_stateless(w, x)?;
        let loss = self.loss_from_mean(w, &mean, y)?;

        let y_vec = to_vec(y);
        let mu_vec = to_vec(mean.as_col());

        Ok(FitSummary::new(
            y.nrows(),
            w.nrows(),
            self.family.deviance(&y_vec, &mu_vec),
            self.family.null_deviance(&y_vec),
            self.family.log_likelihood(&y_vec, &mu_vec),
            loss,
        ))
    }

    /// Fraction of the null deviance explained on `(x, y)`.
    pub fn score(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<f64, RegressionError> {
        Ok(self.summarize(x, y)?.explained_deviance)
    }
}

impl RegressionModel for PoissonRegression {
    fn weights(&self) -> Option<&Col<f64>> {
        self.weights.as_ref()
    }

    fn copy_without_weights(&self) -> Self {
        Self {
            weights: None,
            ..self.clone()
        }
    }

    fn copy_with_weights(&self, w: Col<f64>) -> Self {
        Self {
            lambda: self.lambda,
            weights: Some(w),
            family: self.family,
        }
    }

    /// Every entry finite, integral and non-negative.
    fn target_variable_appropriate(&self, y: &Col<f64>) -> bool {
        y.iter().all(|&yi| self.family.in_support(yi))
    }

    fn validate_target(&self, y: &Col<f64>) -> Result<(), RegressionError> {
        match self.family.first_out_of_support(&to_vec(y)) {
            None => Ok(()),
            Some((index, value)) => Err(RegressionError::IncompatibleTarget {
                reason: format!("y[{index}] = {value} is not a non-negative integer count"),
            }),
        }
    }

    /// floor(exp(X·w)): the mean truncated to a count.
    fn predict_stateless(&self, w: &Col<f64>, x: &Mat<f64>) -> Result<Col<f64>, RegressionError> {
        let mean = self.predict_mean_stateless(w, x)?;
        let mu = mean.as_col();
        Ok(Col::from_fn(mu.nrows(), |i| mu[i].floor()))
    }

    fn loss_stateless(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<f64, RegressionError> {
        check_observations(x, y)?;
        let mean = self.predict_mean_stateless(w, x)?;
        self.loss_from_mean(w, &mean, y)
    }

    fn loss_grad_stateless(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<Col<f64>, RegressionError> {
        check_observations(x, y)?;
        let mean = self.predict_mean_stateless(w, x)?;
        self.gradient_from_mean(w, &mean, x, y)
    }

    fn evaluate(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<LossEvaluation, RegressionError> {
        check_observations(x, y)?;
        let mean = self.predict_mean_stateless(w, x)?;
        Ok(LossEvaluation {
            loss: self.loss_from_mean(w, &mean, y)?,
            gradient: self.gradient_from_mean(w, &mean, x, y)?,
        })
    }
}

fn check_mean(mean: &PredictedMean, y: &Col<f64>) -> Result<(), RegressionError> {
    if mean.len() != y.nrows() {
        return Err(RegressionError::DimensionMismatch {
            x_rows: mean.len(),
            y_len: y.nrows(),
        });
    }
    if y.nrows() == 0 {
        return Err(RegressionError::EmptyInput);
    }
    Ok(())
}
