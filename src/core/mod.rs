//! Core types for regression analysis.

mod family;
mod options;
mod poisson;
mod result;

pub use family::GlmFamily;
pub use options::{validate_lambda, OptimizerOptions, OptimizerOptionsBuilder, OptionsError};
pub use poisson::PoissonFamily;
pub use result::FitSummary;
