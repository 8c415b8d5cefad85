//! Optimizer traits, the shared result type, and a steepest-descent baseline.
//!
//! [`GradientDescent`] accepts a step only when it satisfies the Armijo
//! sufficient-decrease condition, so its recorded loss sequence never
//! increases. Each iteration evaluates loss and gradient together through
//! [`Objective::evaluate`]. The default optimizer, [`Lbfgs`](super::Lbfgs),
//! lives in its own module.

use crate::core::OptimizerOptions;
use crate::solvers::traits::{LossEvaluation, RegressionError};
use crate::utils::matrix::{dot, inf_norm};
use faer::Col;
use std::fmt;

/// A differentiable objective over a weight vector.
pub trait Objective {
    /// Length of the weight vector the objective expects.
    fn dimension(&self) -> usize;

    /// Loss and gradient at `w`.
    fn evaluate(&self, w: &Col<f64>) -> Result<LossEvaluation, RegressionError>;
}

/// A minimization routine driving an [`Objective`].
pub trait Optimizer {
    /// Minimize `objective` starting from `initial`.
    ///
    /// Fails with [`RegressionError::ConvergenceFailed`] when the iteration
    /// cap is reached before the gradient norm drops below tolerance.
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Col<f64>,
    ) -> Result<OptimizationResult, RegressionError>;
}

/// Result of a successful minimization.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Weights at the minimum.
    pub weights: Col<f64>,
    /// Loss at the minimum.
    pub loss: f64,
    /// Infinity norm of the gradient at the minimum.
    pub gradient_norm: f64,
    /// Number of accepted steps.
    pub iterations: usize,
    /// Number of objective evaluations, line-search trials included.
    pub evaluations: usize,
    /// Loss after the start and after every accepted step.
    pub loss_history: Vec<f64>,
}

impl OptimizationResult {
    pub(crate) fn converged(
        weights: Col<f64>,
        at: LossEvaluation,
        iterations: usize,
        evaluations: usize,
        loss_history: Vec<f64>,
    ) -> Self {
        let gradient_norm = inf_norm(&at.gradient);
        log::debug!(
            "converged after {} iterations: loss={:.10} gradient_norm={:.3e} evaluations={}",
            iterations,
            at.loss,
            gradient_norm,
            evaluations
        );
        Self {
            weights,
            loss: at.loss,
            gradient_norm,
            iterations,
            evaluations,
            loss_history,
        }
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OptimizationResult(loss={:.6}, gradient_norm={:.3e}, iterations={}, evaluations={})",
            self.loss, self.gradient_norm, self.iterations, self.evaluations
        )
    }
}

/// Steepest descent with backtracking line search.
///
/// This is the only optimizer that reads the backtracking options
/// (`c1`, `shrink`, `max_line_search`, `initial_step`).
#[derive(Debug, Clone, Default)]
pub struct GradientDescent {
    options: OptimizerOptions,
}

impl GradientDescent {
    /// Create a gradient-descent optimizer, validating the options.
    pub fn new(options: OptimizerOptions) -> Result<Self, RegressionError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }
}

impl Optimizer for GradientDescent {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Col<f64>,
    ) -> Result<OptimizationResult, RegressionError> {
        let opts = &self.options;
        let mut search = Search::start(objective, initial)?;
        let mut step = opts.initial_step;

        for _ in 0..opts.max_iterations {
            if search.gradient_norm() < opts.tolerance {
                return Ok(search.finish());
            }

            let direction = Col::from_fn(search.current.gradient.nrows(), |i| {
                -search.current.gradient[i]
            });
            match search.line_search(objective, &direction, step, opts)? {
                Some(accepted) => {
                    // Let the step grow back after a successful iteration.
                    step = (accepted / opts.shrink).min(opts.initial_step.max(accepted));
                }
                None => return Err(search.stalled()),
            }
        }

        if search.gradient_norm() < opts.tolerance {
            return Ok(search.finish());
        }
        Err(iteration_cap_reached(opts.max_iterations, search.gradient_norm()))
    }
}

/// Running state of a gradient-descent run.
struct Search {
    weights: Col<f64>,
    current: LossEvaluation,
    iterations: usize,
    evaluations: usize,
    loss_history: Vec<f64>,
}

impl Search {
    fn start(objective: &dyn Objective, initial: Col<f64>) -> Result<Self, RegressionError> {
        check_start_dimension(objective, &initial)?;
        let current = objective.evaluate(&initial)?;
        check_start_finite(&current)?;

        Ok(Self {
            weights: initial,
            loss_history: vec![current.loss],
            current,
            iterations: 0,
            evaluations: 1,
        })
    }

    fn gradient_norm(&self) -> f64 {
        inf_norm(&self.current.gradient)
    }

    /// Backtrack along `direction` from `step` until the Armijo condition
    /// holds. Returns the accepted step, or `None` if no trial was accepted.
    fn line_search(
        &mut self,
        objective: &dyn Objective,
        direction: &Col<f64>,
        step: f64,
        opts: &OptimizerOptions,
    ) -> Result<Option<f64>, RegressionError> {
        let slope = dot(&self.current.gradient, direction);
        let mut step = step;

        for _ in 0..opts.max_line_search {
            let trial_w = Col::from_fn(self.weights.nrows(), |i| {
                self.weights[i] + step * direction[i]
            });
            let trial = objective.evaluate(&trial_w)?;
            self.evaluations += 1;

            if is_finite(&trial) && trial.loss <= self.current.loss + opts.c1 * step * slope {
                self.iterations += 1;
                log::trace!(
                    "iteration {}: loss={:.10} step={:.3e}",
                    self.iterations,
                    trial.loss,
                    step
                );
                self.loss_history.push(trial.loss);
                self.weights = trial_w;
                self.current = trial;
                return Ok(Some(step));
            }
            step *= opts.shrink;
        }

        Ok(None)
    }

    fn stalled(&self) -> RegressionError {
        log::warn!(
            "line search made no progress after {} iterations (loss={:.6}, gradient_norm={:.3e})",
            self.iterations,
            self.current.loss,
            self.gradient_norm()
        );
        RegressionError::NumericalError(format!(
            "line search failed to decrease the loss at iteration {}",
            self.iterations
        ))
    }

    fn finish(self) -> OptimizationResult {
        OptimizationResult::converged(
            self.weights,
            self.current,
            self.iterations,
            self.evaluations,
            self.loss_history,
        )
    }
}

pub(crate) fn check_start_dimension(
    objective: &dyn Objective,
    initial: &Col<f64>,
) -> Result<(), RegressionError> {
    if initial.nrows() != objective.dimension() {
        return Err(RegressionError::WeightLengthMismatch {
            expected: objective.dimension(),
            got: initial.nrows(),
        });
    }
    Ok(())
}

pub(crate) fn check_start_finite(eval: &LossEvaluation) -> Result<(), RegressionError> {
    if !is_finite(eval) {
        return Err(RegressionError::NumericalError(
            "loss or gradient is not finite at the starting point".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn iteration_cap_reached(max_iterations: usize, gradient_norm: f64) -> RegressionError {
    log::warn!(
        "optimizer did not converge in {} iterations (gradient_norm={:.3e})",
        max_iterations,
        gradient_norm
    );
    RegressionError::ConvergenceFailed {
        iterations: max_iterations,
    }
}

pub(crate) fn is_finite(eval: &LossEvaluation) -> bool {
    eval.loss.is_finite() && eval.gradient.iter().all(|g| g.is_finite())
}
