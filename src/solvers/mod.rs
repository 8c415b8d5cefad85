//! Regression models and the optimizers that fit them.

mod lbfgs;
mod optimizer;
mod poisson;
mod traits;

pub use lbfgs::Lbfgs;
pub use optimizer::{GradientDescent, Objective, OptimizationResult, Optimizer};
pub use poisson::{PoissonRegression, PredictedMean};
pub use traits::{
    check_observations, check_weights, LossEvaluation, ModelObjective, RegressionError,
    RegressionModel,
};
