//! Optimizer options and configuration.

use thiserror::Error;

/// Configuration options for the gradient-based optimizers.
#[derive(Debug, Clone)]
pub struct OptimizerOptions {
    /// Maximum number of outer iterations (default: 1000).
    pub max_iterations: usize,
    /// Convergence tolerance on the infinity norm of the gradient (default: 1e-6).
    pub tolerance: f64,
    /// Number of correction pairs kept by L-BFGS (default: 10).
    pub memory: usize,
    /// Armijo sufficient-decrease constant (default: 1e-4).
    ///
    /// This and the remaining fields drive the backtracking search of
    /// `GradientDescent`. `Lbfgs` uses a More-Thuente line search and
    /// ignores them.
    pub c1: f64,
    /// Factor applied to the step after a rejected trial (default: 0.5).
    pub shrink: f64,
    /// Maximum number of trial steps per line search (default: 50).
    pub max_line_search: usize,
    /// First trial step length, and the cap on later steps (default: 1.0).
    pub initial_step: f64,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            memory: 10,
            c1: 1e-4,
            shrink: 0.5,
            max_line_search: 50,
            initial_step: 1.0,
        }
    }
}

/// Errors that can occur when validating configuration.
#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("lambda must be non-negative, got {0}")]
    InvalidLambda(f64),
    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
    #[error("memory must be at least 1, got {0}")]
    InvalidMemory(usize),
    #[error("c1 must be in (0, 1), got {0}")]
    InvalidArmijoConstant(f64),
    #[error("shrink factor must be in (0, 1), got {0}")]
    InvalidShrink(f64),
    #[error("max_line_search must be at least 1, got {0}")]
    InvalidLineSearchSteps(usize),
    #[error("initial_step must be positive, got {0}")]
    InvalidInitialStep(f64),
}

/// Check a ridge strength. NaN is rejected along with negative values.
pub fn validate_lambda(lambda: f64) -> Result<(), OptionsError> {
    if lambda.is_nan() || lambda < 0.0 || lambda.is_infinite() {
        return Err(OptionsError::InvalidLambda(lambda));
    }
    Ok(())
}

impl OptimizerOptions {
    /// Create a new builder for optimizer options.
    pub fn builder() -> OptimizerOptionsBuilder {
        OptimizerOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.tolerance > 0.0) {
            return Err(OptionsError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        if self.memory < 1 {
            return Err(OptionsError::InvalidMemory(self.memory));
        }
        if !(self.c1 > 0.0 && self.c1 < 1.0) {
            return Err(OptionsError::InvalidArmijoConstant(self.c1));
        }
        if !(self.shrink > 0.0 && self.shrink < 1.0) {
            return Err(OptionsError::InvalidShrink(self.shrink));
        }
        if self.max_line_search < 1 {
            return Err(OptionsError::InvalidLineSearchSteps(self.max_line_search));
        }
        if !(self.initial_step > 0.0 && self.initial_step.is_finite()) {
            return Err(OptionsError::InvalidInitialStep(self.initial_step));
        }
        Ok(())
    }
}

/// Builder for `OptimizerOptions`.
#[derive(Debug, Clone, Default)]
pub struct OptimizerOptionsBuilder {
    options: OptimizerOptions,
}

impl OptimizerOptionsBuilder {
    /// Set the maximum number of iterations.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options.max_iterations = max_iter;
        self
    }

    /// Set the gradient-norm convergence tolerance.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.options.tolerance = tol;
        self
    }

    /// Set the L-BFGS history size.
    pub fn memory(mut self, memory: usize) -> Self {
        self.options.memory = memory;
        self
    }

    /// Set the Armijo sufficient-decrease constant.
    pub fn c1(mut self, c1: f64) -> Self {
        self.options.c1 = c1;
        self
    }

    /// Set the backtracking shrink factor.
    pub fn shrink(mut self, shrink: f64) -> Self {
        self.options.shrink = shrink;
        self
    }

    /// Set the maximum number of line-search trials.
    pub fn max_line_search(mut self, steps: usize) -> Self {
        self.options.max_line_search = steps;
        self
    }

    /// Set the first trial step length.
    pub fn initial_step(mut self, step: f64) -> Self {
        self.options.initial_step = step;
        self
    }

    /// Build the options, validating them.
    pub fn build(self) -> Result<OptimizerOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> OptimizerOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(OptimizerOptions::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let opts = OptimizerOptions::builder()
            .max_iterations(50)
            .tolerance(1e-4)
            .memory(5)
            .build()
            .unwrap();

        assert_eq!(opts.max_iterations, 50);
        assert_eq!(opts.tolerance, 1e-4);
        assert_eq!(opts.memory, 5);
    }

    #[test]
    fn test_invalid_tolerance() {
        let result = OptimizerOptions::builder().tolerance(0.0).build();
        assert_eq!(result.unwrap_err(), OptionsError::InvalidTolerance(0.0));
    }

    #[test]
    fn test_invalid_iterations() {
        let result = OptimizerOptions::builder().max_iterations(0).build();
        assert!(matches!(result, Err(OptionsError::InvalidMaxIterations(0))));
    }

    #[test]
    fn test_invalid_shrink() {
        for shrink in [0.0, 1.0, 1.5, f64::NAN] {
            let result = OptimizerOptions::builder().shrink(shrink).build();
            assert!(matches!(result, Err(OptionsError::InvalidShrink(_))));
        }
    }

    #[test]
    fn test_invalid_c1() {
        let result = OptimizerOptions::builder().c1(1.0).build();
        assert!(matches!(result, Err(OptionsError::InvalidArmijoConstant(_))));
    }

    #[test]
    fn test_build_unchecked_skips_validation() {
        let opts = OptimizerOptions::builder().memory(0).build_unchecked();
        assert_eq!(opts.memory, 0);
        assert!(matches!(opts.validate(), Err(OptionsError::InvalidMemory(0))));
    }

    #[test]
    fn test_validate_lambda() {
        assert!(validate_lambda(0.0).is_ok());
        assert!(validate_lambda(3.5).is_ok());
        assert!(matches!(
            validate_lambda(-0.1),
            Err(OptionsError::InvalidLambda(_))
        ));
        assert!(validate_lambda(f64::NAN).is_err());
        assert!(validate_lambda(f64::INFINITY).is_err());
    }
}
