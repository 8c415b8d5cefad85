//! Limited-memory BFGS backed by `argmin`.
//!
//! argmin's L-BFGS calls `cost(x)` and then `gradient(x)` at the same point,
//! and the More-Thuente line search asks for both at every trial. The adapter
//! below keeps the last [`LossEvaluation`] keyed on the parameter vector, so
//! each distinct point costs exactly one [`Objective::evaluate`] call.

use crate::core::OptimizerOptions;
use crate::solvers::optimizer::{
    check_start_dimension, check_start_finite, is_finite, iteration_cap_reached, Objective,
    OptimizationResult, Optimizer,
};
use crate::solvers::traits::{LossEvaluation, RegressionError};
use crate::utils::matrix::{inf_norm, to_vec};
use argmin::core::observers::{Observe, ObserverMode};
use argmin::core::{
    CostFunction, Executor, Gradient, State, TerminationReason, TerminationStatus, KV,
};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use faer::Col;
use std::cell::{Cell, RefCell};
use std::sync::{Arc, Mutex};

/// Limited-memory BFGS with a More-Thuente line search.
///
/// Reads `max_iterations`, `tolerance` and `memory` from its options. The
/// line search picks its own trial steps, so the backtracking options only
/// apply to [`GradientDescent`](super::GradientDescent).
#[derive(Debug, Clone, Default)]
pub struct Lbfgs {
    options: OptimizerOptions,
}

impl Lbfgs {
    /// Create an L-BFGS optimizer, validating the options.
    pub fn new(options: OptimizerOptions) -> Result<Self, RegressionError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in use.
    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }
}

impl Optimizer for Lbfgs {
    fn minimize(
        &self,
        objective: &dyn Objective,
        initial: Col<f64>,
    ) -> Result<OptimizationResult, RegressionError> {
        let opts = &self.options;
        check_start_dimension(objective, &initial)?;

        let memo = Memo::default();
        let start = memo.evaluate(objective, &to_vec(&initial))?;
        check_start_finite(&start)?;
        if inf_norm(&start.gradient) < opts.tolerance {
            return Ok(OptimizationResult::converged(
                initial,
                start.clone(),
                0,
                memo.evaluations.get(),
                vec![start.loss],
            ));
        }

        let solver = LBFGS::new(MoreThuenteLineSearch::new(), opts.memory)
            .with_tolerance_grad(opts.tolerance)
            .map_err(|e| {
                RegressionError::NumericalError(format!("invalid L-BFGS configuration: {e}"))
            })?;

        let trace = LossTrace::default();
        let problem = ArgminObjective {
            objective,
            memo: &memo,
        };
        let run = Executor::new(problem, solver)
            .configure(|state| {
                state
                    .param(to_vec(&initial))
                    .max_iters(opts.max_iterations as u64)
            })
            .add_observer(trace.clone(), ObserverMode::Always)
            .run();

        let res = match run {
            Ok(res) => res,
            Err(e) => {
                // An objective error is reported as itself, not as argmin's wrapper.
                if let Some(err) = memo.failure.borrow_mut().take() {
                    return Err(err);
                }
                log::warn!("L-BFGS stopped with an error: {e}");
                return Err(RegressionError::NumericalError(format!(
                    "L-BFGS line search failed: {e}"
                )));
            }
        };

        let state = res.state();
        let best = state.get_best_param().cloned().ok_or_else(|| {
            RegressionError::NumericalError("L-BFGS produced no iterate".to_string())
        })?;
        let iterations = state.get_iter() as usize;
        let status = state.get_termination_status().clone();

        let at = memo.evaluate(objective, &best)?;
        let gradient_norm = inf_norm(&at.gradient);
        let converged = gradient_norm < opts.tolerance;

        match status {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
            | TerminationStatus::Terminated(TerminationReason::MaxItersReached)
                if converged => {}
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                return Err(iteration_cap_reached(opts.max_iterations, gradient_norm));
            }
            other => {
                log::warn!(
                    "L-BFGS stopped without converging after {} iterations ({}, gradient_norm={:.3e})",
                    iterations,
                    other,
                    gradient_norm
                );
                return Err(RegressionError::NumericalError(format!(
                    "L-BFGS stopped at iteration {iterations}: {other}"
                )));
            }
        }

        let mut loss_history = vec![start.loss];
        loss_history.extend(trace.take()?);

        let weights = Col::from_fn(best.len(), |i| best[i]);
        Ok(OptimizationResult::converged(
            weights,
            at,
            iterations,
            memo.evaluations.get(),
            loss_history,
        ))
    }
}

/// Last evaluated point, evaluation count, and the objective error that
/// aborted the run.
#[derive(Default)]
struct Memo {
    last: RefCell<Option<(Vec<f64>, LossEvaluation)>>,
    evaluations: Cell<usize>,
    failure: RefCell<Option<RegressionError>>,
}

impl Memo {
    fn evaluate(
        &self,
        objective: &dyn Objective,
        params: &[f64],
    ) -> Result<LossEvaluation, RegressionError> {
        if let Some((cached, eval)) = self.last.borrow().as_ref() {
            if cached.as_slice() == params {
                return Ok(eval.clone());
            }
        }

        let w = Col::from_fn(params.len(), |i| params[i]);
        let eval = objective.evaluate(&w)?;
        self.evaluations.set(self.evaluations.get() + 1);
        *self.last.borrow_mut() = Some((params.to_vec(), eval.clone()));
        Ok(eval)
    }
}

/// Exposes an [`Objective`] to argmin.
struct ArgminObjective<'a> {
    objective: &'a dyn Objective,
    memo: &'a Memo,
}

impl ArgminObjective<'_> {
    fn evaluate(&self, params: &[f64]) -> Result<LossEvaluation, argmin::core::Error> {
        let eval = match self.memo.evaluate(self.objective, params) {
            Ok(eval) => eval,
            Err(e) => {
                let msg = e.to_string();
                *self.memo.failure.borrow_mut() = Some(e);
                return Err(argmin::core::Error::msg(msg));
            }
        };
        if !is_finite(&eval) {
            return Err(argmin::core::Error::msg(
                "loss or gradient is not finite at a trial point",
            ));
        }
        Ok(eval)
    }
}

impl CostFunction for ArgminObjective<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        self.evaluate(params).map(|eval| eval.loss)
    }
}

impl Gradient for ArgminObjective<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        self.evaluate(params).map(|eval| to_vec(&eval.gradient))
    }
}

/// Records the best loss after every iteration.
#[derive(Clone, Default)]
struct LossTrace(Arc<Mutex<Vec<f64>>>);

impl LossTrace {
    fn take(&self) -> Result<Vec<f64>, RegressionError> {
        let mut losses = self
            .0
            .lock()
            .map_err(|e| RegressionError::NumericalError(e.to_string()))?;
        Ok(std::mem::take(&mut *losses))
    }
}

impl<I> Observe<I> for LossTrace
where
    I: State<Float = f64>,
{
    fn observe_iter(&mut self, state: &I, _kv: &KV) -> Result<(), argmin::core::Error> {
        let loss = state.get_best_cost();
        log::trace!("iteration {}: loss={:.10}", state.get_iter(), loss);
        self.0
            .lock()
            .map_err(|e| argmin::core::Error::msg(e.to_string()))?
            .push(loss);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::optimizer::tests::{
        assert_non_increasing, NanAtStart, Quadratic, Rosenbrock,
    };
    use approx::assert_relative_eq;

    /// Fails once `w[0]` moves past 0.5.
    struct FailsAwayFromStart;

    impl Objective for FailsAwayFromStart {
        fn dimension(&self) -> usize {
            1
        }

        fn evaluate(&self, w: &Col<f64>) -> Result<LossEvaluation, RegressionError> {
            if w[0] > 0.5 {
                return Err(RegressionError::EmptyInput);
            }
            Ok(LossEvaluation {
                loss: (w[0] - 1.0).powi(2),
                gradient: Col::from_fn(1, |_| 2.0 * (w[0] - 1.0)),
            })
        }
    }

    #[test]
    fn test_lbfgs_quadratic() {
        let objective = Quadratic::new();
        let result = Lbfgs::default()
            .minimize(&objective, Col::zeros(2))
            .unwrap();

        assert_relative_eq!(result.weights[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(result.weights[1], -1.0, epsilon = 1e-5);
        assert!(result.loss < 1e-10);
        assert!(result.gradient_norm < 1e-6);
        assert_eq!(result.loss_history[0], 14.0);
        assert_non_increasing(&result.loss_history);
    }

    #[test]
    fn test_cost_then_gradient_shares_one_evaluation() {
        let objective = Quadratic::new();
        let memo = Memo::default();
        let problem = ArgminObjective {
            objective: &objective,
            memo: &memo,
        };
        let point = vec![1.0, 0.0];

        assert_eq!(problem.cost(&point).unwrap(), 11.0);
        assert_eq!(problem.gradient(&point).unwrap(), vec![-2.0, 20.0]);
        assert_eq!(objective.calls.get(), 1);

        problem.cost(&vec![0.0, 0.0]).unwrap();
        assert_eq!(objective.calls.get(), 2);
        assert_eq!(memo.evaluations.get(), 2);
    }

    #[test]
    fn test_evaluations_match_objective_calls() {
        let objective = Quadratic::new();
        let result = Lbfgs::default()
            .minimize(&objective, Col::zeros(2))
            .unwrap();

        assert_eq!(result.evaluations, objective.calls.get());
        assert_eq!(result.loss_history.len(), result.iterations + 1);
    }

    #[test]
    fn test_lbfgs_rosenbrock() {
        let options = OptimizerOptions::builder()
            .max_iterations(2000)
            .build()
            .unwrap();
        let result = Lbfgs::new(options)
            .unwrap()
            .minimize(&Rosenbrock, Col::zeros(2))
            .unwrap();

        assert_relative_eq!(result.weights[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.weights[1], 1.0, epsilon = 1e-3);
        assert_non_increasing(&result.loss_history);
    }

    #[test]
    fn test_already_at_minimum() {
        let start = Col::from_fn(2, |i| if i == 0 { 2.0 } else { -1.0 });
        let result = Lbfgs::default().minimize(&Quadratic::new(), start).unwrap();

        assert_eq!(result.iterations, 0);
        assert_eq!(result.evaluations, 1);
        assert_eq!(result.loss, 0.0);
    }

    #[test]
    fn test_iteration_cap() {
        let options = OptimizerOptions::builder()
            .max_iterations(2)
            .tolerance(1e-12)
            .build()
            .unwrap();
        let result = Lbfgs::new(options)
            .unwrap()
            .minimize(&Rosenbrock, Col::zeros(2));

        assert!(matches!(
            result,
            Err(RegressionError::ConvergenceFailed { iterations: 2 })
        ));
    }

    #[test]
    fn test_objective_error_is_returned() {
        let result = Lbfgs::default().minimize(&FailsAwayFromStart, Col::zeros(1));
        assert!(matches!(result, Err(RegressionError::EmptyInput)));
    }

    #[test]
    fn test_wrong_dimension() {
        let result = Lbfgs::default().minimize(&Quadratic::new(), Col::zeros(3));
        assert!(matches!(
            result,
            Err(RegressionError::WeightLengthMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_non_finite_start() {
        let result = Lbfgs::default().minimize(&NanAtStart, Col::zeros(1));
        assert!(matches!(result, Err(RegressionError::NumericalError(_))));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = OptimizerOptions::builder().memory(0).build_unchecked();
        assert!(matches!(
            Lbfgs::new(options),
            Err(RegressionError::InvalidOptions(_))
        ));
    }
}
