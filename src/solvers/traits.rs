//! Core traits for linear regression models.
//!
//! [`RegressionModel`] is the contract every model variant implements. A model
//! supplies weight access, copy-on-fit reconstruction, a target check and three
//! stateless evaluations (prediction, loss, loss gradient) at an arbitrary
//! weight vector. Fitting, prediction with stored weights and the fitted check
//! are derived from those, so one optimizer drives every model the same way.

use crate::core::OptionsError;
use crate::solvers::lbfgs::Lbfgs;
use crate::solvers::optimizer::{Objective, OptimizationResult, Optimizer};
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during regression fitting and prediction.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("weight length mismatch: X has {expected} columns but weights have {got} entries")]
    WeightLengthMismatch { expected: usize, got: usize },

    #[error("empty input: at least one observation is required")]
    EmptyInput,

    #[error("incompatible target: {reason}")]
    IncompatibleTarget { reason: String },

    #[error("model is not fitted")]
    NotFitted,

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("convergence failed after {iterations} iterations")]
    ConvergenceFailed { iterations: usize },

    #[error("numerical error: {0}")]
    NumericalError(String),
}

/// Loss and gradient of a model at one weight vector.
#[derive(Debug, Clone)]
pub struct LossEvaluation {
    /// Regularized loss.
    pub loss: f64,
    /// Gradient of the loss with respect to the weights.
    pub gradient: Col<f64>,
}

/// A linear regression model that can be fit by a gradient-based optimizer.
///
/// Weight vectors follow the layout of the design matrix: entry 0 is the bias
/// and pairs with a column of ones (see [`crate::utils::add_intercept_column`]).
///
/// # Example
///
/// ```
/// use ridge_glm::prelude::*;
/// use faer::{Col, Mat};
///
/// let x = add_intercept_column(&Mat::from_fn(5, 1, |i, _| i as f64));
/// let y = Col::from_fn(5, |i| [0.0, 1.0, 2.0, 1.0, 3.0][i]);
///
/// let model = PoissonRegression::new();
/// assert!(!model.is_fitted());
///
/// let fitted = model.fit(&x, &y).unwrap();
/// assert!(fitted.is_fitted());
/// assert!(!model.is_fitted());
///
/// let counts = fitted.predict(&x).unwrap();
/// assert_eq!(counts.nrows(), 5);
/// ```
pub trait RegressionModel: Sized {
    /// Current weights, `None` before fitting.
    fn weights(&self) -> Option<&Col<f64>>;

    /// An equivalent model with the weights cleared.
    fn copy_without_weights(&self) -> Self;

    /// A new model carrying the weight vector `w`.
    fn copy_with_weights(&self, w: Col<f64>) -> Self;

    /// Whether `y` is compatible with the model's likelihood.
    fn target_variable_appropriate(&self, y: &Col<f64>) -> bool;

    /// Point predictions at weights `w`, ignoring the stored weights.
    fn predict_stateless(&self, w: &Col<f64>, x: &Mat<f64>) -> Result<Col<f64>, RegressionError>;

    /// Regularized loss at weights `w`.
    fn loss_stateless(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<f64, RegressionError>;

    /// Gradient of [`RegressionModel::loss_stateless`] with respect to `w`.
    fn loss_grad_stateless(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<Col<f64>, RegressionError>;

    /// Loss and gradient together.
    ///
    /// Models that share an expensive intermediate between the two should
    /// override this to compute it once.
    fn evaluate(
        &self,
        w: &Col<f64>,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<LossEvaluation, RegressionError> {
        Ok(LossEvaluation {
            loss: self.loss_stateless(w, x, y)?,
            gradient: self.loss_grad_stateless(w, x, y)?,
        })
    }

    /// Fail with [`RegressionError::IncompatibleTarget`] when the target check fails.
    fn validate_target(&self, y: &Col<f64>) -> Result<(), RegressionError> {
        if self.target_variable_appropriate(y) {
            Ok(())
        } else {
            Err(RegressionError::IncompatibleTarget {
                reason: "target values are outside the model's support".to_string(),
            })
        }
    }

    /// True iff weights are present.
    fn is_fitted(&self) -> bool {
        self.weights().is_some()
    }

    /// Predict with the stored weights.
    fn predict(&self, x: &Mat<f64>) -> Result<Col<f64>, RegressionError> {
        let w = self.weights().ok_or(RegressionError::NotFitted)?;
        self.predict_stateless(w, x)
    }

    /// Fit with the default L-BFGS optimizer, returning a new fitted model.
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self, RegressionError> {
        self.fit_with(x, y, &Lbfgs::default())
            .map(|(fitted, _)| fitted)
    }

    /// Fit with a caller-supplied optimizer.
    ///
    /// The search starts from the zero vector. The original model is never
    /// modified; on success the fitted copy and the optimizer trace are returned.
    fn fit_with<O: Optimizer + ?Sized>(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        optimizer: &O,
    ) -> Result<(Self, OptimizationResult), RegressionError> {
        check_observations(x, y)?;
        self.validate_target(y)?;

        let objective = ModelObjective {
            model: self,
            x,
            y,
        };
        let result = optimizer.minimize(&objective, Col::zeros(x.ncols()))?;

        Ok((self.copy_with_weights(result.weights.clone()), result))
    }
}

/// Adapts a model and its training data to the optimizer's objective interface.
pub struct ModelObjective<'a, M> {
    model: &'a M,
    x: &'a Mat<f64>,
    y: &'a Col<f64>,
}

impl<'a, M: RegressionModel> ModelObjective<'a, M> {
    /// Bind a model to the data it is evaluated on.
    pub fn new(model: &'a M, x: &'a Mat<f64>, y: &'a Col<f64>) -> Self {
        Self { model, x, y }
    }
}

impl<M: RegressionModel> Objective for ModelObjective<'_, M> {
    fn dimension(&self) -> usize {
        self.x.ncols()
    }

    fn evaluate(&self, w: &Col<f64>) -> Result<LossEvaluation, RegressionError> {
        self.model.evaluate(w, self.x, self.y)
    }
}

/// Check that `X` and `y` describe the same, non-empty set of observations.
pub fn check_observations(x: &Mat<f64>, y: &Col<f64>) -> Result<(), RegressionError> {
    if x.nrows() != y.nrows() {
        return Err(RegressionError::DimensionMismatch {
            x_rows: x.nrows(),
            y_len: y.nrows(),
        });
    }
    if x.nrows() == 0 {
        return Err(RegressionError::EmptyInput);
    }
    Ok(())
}

/// Check that a weight vector matches the columns of `X`.
pub fn check_weights(w: &Col<f64>, x: &Mat<f64>) -> Result<(), RegressionError> {
    if w.nrows() != x.ncols() {
        return Err(RegressionError::WeightLengthMismatch {
            expected: x.ncols(),
            got: w.nrows(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_observations() {
        let x = Mat::<f64>::zeros(3, 2);
        assert!(check_observations(&x, &Col::zeros(3)).is_ok());
        assert!(matches!(
            check_observations(&x, &Col::zeros(4)),
            Err(RegressionError::DimensionMismatch { x_rows: 3, y_len: 4 })
        ));
        assert!(matches!(
            check_observations(&Mat::<f64>::zeros(0, 2), &Col::zeros(0)),
            Err(RegressionError::EmptyInput)
        ));
    }

    #[test]
    fn test_check_weights() {
        let x = Mat::<f64>::zeros(3, 2);
        assert!(check_weights(&Col::zeros(2), &x).is_ok());
        assert!(matches!(
            check_weights(&Col::zeros(3), &x),
            Err(RegressionError::WeightLengthMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = RegressionError::from(OptionsError::InvalidLambda(-1.0));
        assert_eq!(err.to_string(), "invalid options: lambda must be non-negative, got -1");
        assert_eq!(RegressionError::NotFitted.to_string(), "model is not fitted");
    }
}
