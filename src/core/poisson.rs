//! Poisson family for count data regression.
//!
//! Only the canonical log link is provided: μ = exp(η).
//!
//! # Example
//!
//! ```
//! use ridge_glm::core::{GlmFamily, PoissonFamily};
//!
//! let poisson = PoissonFamily;
//! assert_eq!(poisson.mean(0.0), 1.0);
//! assert!(poisson.in_support(3.0));
//! assert!(!poisson.in_support(2.5));
//! ```

use super::family::GlmFamily;
use statrs::function::factorial::ln_factorial;

/// Poisson family with log link.
///
/// # Variance Function
///
/// V(μ) = μ
///
/// # Unit Deviance
///
/// d(y, μ) = 2[y·log(y/μ) - (y - μ)], with d(0, μ) = 2μ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoissonFamily;

impl PoissonFamily {
    /// The term y·log(μ) - μ summed into the log-likelihood kernel.
    ///
    /// For y = 0 this is -μ, which keeps the term finite when exp(η)
    /// underflows to zero.
    #[inline]
    pub fn kernel(&self, y: f64, mu: f64) -> f64 {
        if y == 0.0 {
            -mu
        } else {
            y * mu.ln() - mu
        }
    }
}

impl GlmFamily for PoissonFamily {
    #[inline]
    fn mean(&self, eta: f64) -> f64 {
        eta.exp()
    }

    fn unit_deviance(&self, y: f64, mu: f64) -> f64 {
        let mu_clamped = mu.max(1e-10);

        if y == 0.0 {
            2.0 * mu_clamped
        } else {
            2.0 * (y * (y / mu_clamped).ln() - (y - mu_clamped))
        }
    }

    /// log p(y | μ) = y·log(μ) - μ - log(y!)
    fn log_likelihood_unit(&self, y: f64, mu: f64) -> f64 {
        self.kernel(y, mu) - ln_factorial(y as u64)
    }

    /// Non-negative, finite and integral.
    fn in_support(&self, y: f64) -> bool {
        y.is_finite() && y == y.floor() && y >= 0.0
    }
}
