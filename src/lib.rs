//! Ridge-regularized generalized linear regression.
//!
//! Every model implements [`RegressionModel`]: it exposes its weights, can be
//! rebuilt with or without weights, checks that a target vector fits its
//! likelihood, and evaluates prediction, loss and loss gradient at any weight
//! vector. Fitting and prediction are derived from those operations, so one
//! optimizer fits every model.
//!
//! # Example
//!
//! ```rust
//! use ridge_glm::prelude::*;
//! use faer::{Col, Mat};
//!
//! // Bias column of ones followed by one feature.
//! let x = add_intercept_column(&Mat::from_fn(5, 1, |i, _| i as f64));
//! let y = Col::from_fn(5, |i| [0.0, 1.0, 2.0, 1.0, 3.0][i]);
//!
//! let fitted = PoissonRegression::with_lambda(0.01)?.fit(&x, &y)?;
//!
//! let counts = fitted.predict(&x)?;
//! let summary = fitted.summarize(&x, &y)?;
//! println!("{summary}");
//! # Ok::<(), RegressionError>(())
//! ```

pub mod core;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{FitSummary, GlmFamily, OptimizerOptions, OptionsError, PoissonFamily};
    pub use crate::solvers::{
        GradientDescent, Lbfgs, LossEvaluation, Objective, OptimizationResult, Optimizer,
        PoissonRegression, PredictedMean, RegressionError, RegressionModel,
    };
    pub use crate::utils::add_intercept_column;
}

pub use crate::core::{FitSummary, OptimizerOptions, OptionsError};
pub use crate::solvers::{
    GradientDescent, Lbfgs, PoissonRegression, RegressionError, RegressionModel,
};
