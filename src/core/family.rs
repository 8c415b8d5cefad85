//! Distribution families for generalized linear models.

/// A likelihood family paired with its mean function.
///
/// Implementations supply the inverse link and the per-observation
/// quantities; totals over a sample are provided.
pub trait GlmFamily {
    /// Inverse link: maps the linear predictor η = x·w to the mean μ.
    fn mean(&self, eta: f64) -> f64;

    /// Unit deviance d(y, μ) ≥ 0, zero when μ = y.
    fn unit_deviance(&self, y: f64, mu: f64) -> f64;

    /// Log-likelihood of one observation.
    fn log_likelihood_unit(&self, y: f64, mu: f64) -> f64;

    /// Whether a single target value lies in the family's support.
    fn in_support(&self, y: f64) -> bool;

    /// Total deviance: Σ d(yᵢ, μᵢ).
    fn deviance(&self, y: &[f64], mu: &[f64]) -> f64 {
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mi)| self.unit_deviance(yi, mi))
            .sum()
    }

    /// Total log-likelihood: Σ log p(yᵢ | μᵢ).
    fn log_likelihood(&self, y: &[f64], mu: &[f64]) -> f64 {
        y.iter()
            .zip(mu.iter())
            .map(|(&yi, &mi)| self.log_likelihood_unit(yi, mi))
            .sum()
    }

    /// Deviance of the intercept-only model, where every μᵢ is the sample mean.
    fn null_deviance(&self, y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        y.iter().map(|&yi| self.unit_deviance(yi, y_mean)).sum()
    }

    /// Index and value of the first target outside the support, if any.
    fn first_out_of_support(&self, y: &[f64]) -> Option<(usize, f64)> {
        y.iter()
            .enumerate()
            .find(|&(_, &yi)| !self.in_support(yi))
            .map(|(i, &yi)| (i, yi))
    }
}
