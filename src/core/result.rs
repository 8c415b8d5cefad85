//! Fit summary structures.

use std::fmt;

/// Goodness-of-fit statistics for a fitted model on a given dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// Number of observations.
    pub n_observations: usize,

    /// Number of parameters (including the bias term).
    pub n_parameters: usize,

    /// Residual deviance.
    pub deviance: f64,

    /// Deviance of the intercept-only model.
    pub null_deviance: f64,

    /// Fraction of the null deviance explained: 1 - deviance / null_deviance.
    /// NaN when the null deviance is zero.
    pub explained_deviance: f64,

    /// Log-likelihood.
    pub log_likelihood: f64,

    /// Akaike Information Criterion.
    pub aic: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    /// Regularized training loss at the fitted weights.
    pub loss: f64,
}

impl FitSummary {
    /// Assemble a summary from the raw likelihood quantities.
    pub(crate) fn new(
        n_observations: usize,
        n_parameters: usize,
        deviance: f64,
        null_deviance: f64,
        log_likelihood: f64,
        loss: f64,
    ) -> Self {
        let n = n_observations as f64;
        let k = n_parameters as f64;

        let explained_deviance = if null_deviance > 0.0 {
            1.0 - deviance / null_deviance
        } else {
            f64::NAN
        };

        Self {
            n_observations,
            n_parameters,
            deviance,
            null_deviance,
            explained_deviance,
            log_likelihood,
            aic: 2.0 * k - 2.0 * log_likelihood,
            bic: k * n.ln() - 2.0 * log_likelihood,
            loss,
        }
    }

    /// Residual degrees of freedom.
    pub fn df_residual(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }
}

impl fmt::Display for FitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FitSummary(n={}, k={}, deviance={:.6}, null_deviance={:.6}, loglik={:.6}, aic={:.4})",
            self.n_observations,
            self.n_parameters,
            self.deviance,
            self.null_deviance,
            self.log_likelihood,
            self.aic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_information_criteria() {
        let summary = FitSummary::new(10, 2, 4.0, 8.0, -12.0, 1.2);

        assert_relative_eq!(summary.aic, 2.0 * 2.0 + 24.0);
        assert_relative_eq!(summary.bic, 2.0 * 10.0_f64.ln() + 24.0);
        assert_relative_eq!(summary.explained_deviance, 0.5);
        assert_eq!(summary.df_residual(), 8);
    }

    #[test]
    fn test_zero_null_deviance() {
        let summary = FitSummary::new(3, 1, 0.0, 0.0, -3.0, 1.0);
        assert!(summary.explained_deviance.is_nan());
    }

    #[test]
    fn test_display() {
        let summary = FitSummary::new(5, 2, 1.0, 2.0, -6.0, 0.5);
        let text = summary.to_string();
        assert!(text.starts_with("FitSummary(n=5, k=2"));
    }
}
